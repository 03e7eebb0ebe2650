use crate::domain::plan::SlotTime;

/// The Toolbox entry-time grid: 09:33, 09:39, 09:45, 09:52, then eight
/// slots per hour from 10:00, ending at 15:45 (51 slots total).
pub fn schedule_times() -> Vec<SlotTime> {
    let mut times = vec![
        SlotTime::new(9, 33),
        SlotTime::new(9, 39),
        SlotTime::new(9, 45),
        SlotTime::new(9, 52),
    ];
    for hour in 10..=15 {
        for minute in [0, 8, 15, 23, 30, 38, 45, 53] {
            if hour == 15 && minute > 45 {
                continue;
            }
            times.push(SlotTime::new(hour, minute));
        }
    }
    times
}

/// Plan labels `P1`..`Pn`.
pub fn plan_labels(count: u32) -> Vec<String> {
    (1..=count).map(|i| format!("P{}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_51_slots() {
        let times = schedule_times();
        assert_eq!(times.len(), 51);
        assert_eq!(times.first().unwrap().to_string(), "09:33");
        assert_eq!(times.last().unwrap().to_string(), "15:45");
    }

    #[test]
    fn grid_matches_known_slots() {
        let rendered: Vec<String> = schedule_times().iter().map(|t| t.to_string()).collect();
        for expected in ["09:52", "10:08", "12:23", "14:53", "15:00"] {
            assert!(rendered.iter().any(|t| t == expected), "missing {expected}");
        }
        assert!(!rendered.iter().any(|t| t == "15:53"));
    }

    #[test]
    fn plan_label_sequence() {
        assert_eq!(plan_labels(3), vec!["P1", "P2", "P3"]);
        assert!(plan_labels(0).is_empty());
    }
}
