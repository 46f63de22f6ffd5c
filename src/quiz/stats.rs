use serde::Serialize;

use crate::models::AnswerRecord;

/// Number of trailing records included in a summary
pub const RECENT_RECORDS: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayProgress {
    pub day: String,
    pub attempts: usize,
    pub correct: usize,
    pub percent: f64,
}

/// Correct-answer rates over a session's records
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressSummary {
    pub attempts: usize,
    pub correct: usize,
    pub percent: f64,
    pub by_day: Vec<DayProgress>,
    pub recent: Vec<AnswerRecord>,
}

pub fn summarize(records: &[AnswerRecord]) -> ProgressSummary {
    let attempts = records.len();
    let correct = count_correct(records.iter());

    let mut days: Vec<&str> = Vec::new();
    for day in records.iter().filter_map(|r| r.day.as_deref()) {
        if !days.contains(&day) {
            days.push(day);
        }
    }

    let by_day = days
        .into_iter()
        .map(|day| {
            let for_day = records.iter().filter(|r| r.day.as_deref() == Some(day));
            let attempts = for_day.clone().count();
            let correct = count_correct(for_day);
            DayProgress {
                day: day.to_string(),
                attempts,
                correct,
                percent: percent(correct, attempts),
            }
        })
        .collect();

    let recent = records[attempts.saturating_sub(RECENT_RECORDS)..].to_vec();

    ProgressSummary {
        attempts,
        correct,
        percent: percent(correct, attempts),
        by_day,
        recent,
    }
}

fn count_correct<'a>(records: impl Iterator<Item = &'a AnswerRecord>) -> usize {
    records.filter(|r| r.result.is_correct()).count()
}

/// Percentage rounded to two decimals
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerResult;

    fn record(word: &str, result: AnswerResult, day: Option<&str>) -> AnswerRecord {
        AnswerRecord {
            word: word.to_string(),
            result,
            day: day.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.percent, 0.0);
        assert!(summary.by_day.is_empty());
        assert!(summary.recent.is_empty());
    }

    #[test]
    fn test_overall_and_per_day_rates() {
        let records = vec![
            record("Apple", AnswerResult::Correct, Some("Day1")),
            record("Run", AnswerResult::Incorrect, Some("Day1")),
            record("Run", AnswerResult::Correct, Some("Day1")),
            record("Happy", AnswerResult::Incorrect, Some("Day2")),
            record("Book", AnswerResult::Correct, None),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.attempts, 5);
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.percent, 60.0);

        assert_eq!(summary.by_day.len(), 2);
        assert_eq!(summary.by_day[0].day, "Day1");
        assert_eq!(summary.by_day[0].percent, 66.67);
        assert_eq!(summary.by_day[1].percent, 0.0);
    }

    #[test]
    fn test_recent_keeps_last_ten() {
        let records: Vec<_> = (0..15)
            .map(|i| record(&format!("w{}", i), AnswerResult::Correct, None))
            .collect();
        let summary = summarize(&records);
        assert_eq!(summary.recent.len(), RECENT_RECORDS);
        assert_eq!(summary.recent[0].word, "w5");
        assert_eq!(summary.recent[9].word, "w14");
    }
}
