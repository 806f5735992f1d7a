use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;

use crate::models::{PickHistoryEntry, Student};

/// Random student picker. Two states: idle and rolling. While rolling, an
/// external ticker advances the cursor for the spin display; `stop()`
/// resolves the winner from the cursor position so the announced student is
/// the one the spinner showed.
///
/// The available pool is always recomputed wholesale from
/// `roster ∩ selected`, minus already-drawn students when avoid-repeat is
/// on. Callers cannot tell a checkbox exclusion from a history exclusion.
pub struct Picker {
    roster: Vec<Student>,
    selected: HashSet<String>,
    available: Vec<Student>,
    history: Vec<PickHistoryEntry>,
    avoid_repeat: bool,
    rolling: bool,
    cursor: usize,
    winner: Option<Student>,
}

impl Picker {
    pub fn new(roster: Vec<Student>, history: Vec<PickHistoryEntry>, avoid_repeat: bool) -> Self {
        let selected: HashSet<String> = roster.iter().map(|s| s.id.clone()).collect();
        let mut picker = Picker {
            roster,
            selected,
            available: Vec::new(),
            history,
            avoid_repeat,
            rolling: false,
            cursor: 0,
            winner: None,
        };
        picker.available = picker.compute_pool();
        picker
    }

    fn compute_pool(&self) -> Vec<Student> {
        let drawn: HashSet<&str> = if self.avoid_repeat {
            self.history.iter().map(|e| e.student.id.as_str()).collect()
        } else {
            HashSet::new()
        };
        self.roster
            .iter()
            .filter(|s| self.selected.contains(&s.id) && !drawn.contains(s.id.as_str()))
            .cloned()
            .collect()
    }

    pub fn available(&self) -> &[Student] {
        &self.available
    }

    pub fn history(&self) -> &[PickHistoryEntry] {
        &self.history
    }

    pub fn winner(&self) -> Option<&Student> {
        self.winner.as_ref()
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// The student the spinner currently shows, if any.
    pub fn current(&self) -> Option<&Student> {
        self.available.get(self.cursor)
    }

    /// Enters the rolling state. No-op (returns false) while already
    /// rolling or when the freshly recomputed pool is empty.
    pub fn start(&mut self) -> bool {
        if self.rolling {
            return false;
        }
        self.available = self.compute_pool();
        if self.available.is_empty() {
            return false;
        }
        self.cursor = 0;
        self.rolling = true;
        true
    }

    /// One animation step: advance the cursor modulo pool size.
    pub fn tick(&mut self) {
        if self.rolling && !self.available.is_empty() {
            self.cursor = (self.cursor + 1) % self.available.len();
        }
    }

    /// Leaves the rolling state and resolves the winner: the student under
    /// the cursor, or a fresh uniform index when the cursor is out of
    /// bounds. Prepends the pick to history and, in avoid-repeat mode,
    /// drops the winner from the in-memory pool immediately.
    pub fn stop(&mut self, rng: &mut impl Rng) -> Option<Student> {
        if !self.rolling {
            return None;
        }
        self.rolling = false;

        if self.available.is_empty() {
            return None;
        }
        let index = if self.cursor < self.available.len() {
            self.cursor
        } else {
            rng.gen_range(0..self.available.len())
        };

        let winner = self.available[index].clone();
        self.history.insert(
            0,
            PickHistoryEntry {
                student: winner.clone(),
                time: Utc::now().timestamp_millis(),
            },
        );
        if self.avoid_repeat {
            self.available.remove(index);
        }
        self.winner = Some(winner.clone());
        Some(winner)
    }

    /// Clears history and restores the full roster as selected/available.
    pub fn reset(&mut self) {
        self.history.clear();
        self.selected = self.roster.iter().map(|s| s.id.clone()).collect();
        self.available = self.roster.clone();
        self.rolling = false;
        self.cursor = 0;
        self.winner = None;
    }

    /// Swaps in a reloaded roster; selection goes back to "all" and any
    /// rolling state is abandoned. History is kept and re-applied on the
    /// next `start()`.
    pub fn refresh(&mut self, roster: Vec<Student>) {
        self.roster = roster;
        self.selected = self.roster.iter().map(|s| s.id.clone()).collect();
        self.rolling = false;
        self.cursor = 0;
        self.winner = None;
        self.available = self.compute_pool();
    }

    /// Takes a student out of the inclusion set, as the roster checkboxes
    /// do. The pool filter treats this exactly like a history exclusion.
    pub fn deselect(&mut self, id: &str) {
        self.selected.remove(id);
        self.available = self.compute_pool();
    }

    /// Consumes the picker, handing back the history for persistence.
    pub fn into_history(self) -> Vec<PickHistoryEntry> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvaluationTags;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            evaluation_tags: EvaluationTags::default(),
        }
    }

    fn roster_abc() -> Vec<Student> {
        vec![
            student("a", "张小明"),
            student("b", "李小红"),
            student("c", "王小华"),
        ]
    }

    #[test]
    fn start_on_empty_pool_is_a_no_op() {
        let mut picker = Picker::new(Vec::new(), Vec::new(), false);
        assert!(!picker.start());
        assert!(!picker.is_rolling());
        assert!(picker.winner().is_none());
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), false);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(picker.stop(&mut rng).is_none());
        assert!(picker.history().is_empty());
    }

    #[test]
    fn start_while_rolling_is_a_no_op() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), false);
        assert!(picker.start());
        assert!(!picker.start());
        assert!(picker.is_rolling());
    }

    #[test]
    fn winner_is_the_student_under_the_cursor() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), false);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(picker.start());
        for _ in 0..4 {
            picker.tick();
        }
        // four ticks over three students leaves the cursor at index 1
        let winner = picker.stop(&mut rng).unwrap();
        assert_eq!(winner.id, "b");
        assert_eq!(picker.winner().unwrap().id, "b");
        assert!(!picker.is_rolling());
    }

    #[test]
    fn stop_prepends_exactly_one_history_entry() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(2);

        picker.start();
        picker.tick();
        let first = picker.stop(&mut rng).unwrap();
        assert_eq!(picker.history().len(), 1);

        picker.start();
        let second = picker.stop(&mut rng).unwrap();
        assert_eq!(picker.history().len(), 2);
        // newest first
        assert_eq!(picker.history()[0].student.id, second.id);
        assert_eq!(picker.history()[1].student.id, first.id);
    }

    #[test]
    fn avoid_repeat_excludes_the_winner_from_the_next_pool() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(3);

        picker.start();
        let winner = picker.stop(&mut rng).unwrap();
        assert!(!picker.available().iter().any(|s| s.id == winner.id));

        picker.start();
        assert!(!picker.available().iter().any(|s| s.id == winner.id));
    }

    #[test]
    fn three_draws_exhaust_a_three_student_pool() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..3 {
            assert!(picker.start());
            picker.tick();
            assert!(picker.stop(&mut rng).is_some());
        }

        assert_eq!(picker.history().len(), 3);
        let mut drawn: Vec<&str> = picker
            .history()
            .iter()
            .map(|e| e.student.id.as_str())
            .collect();
        drawn.sort_unstable();
        drawn.dedup();
        assert_eq!(drawn.len(), 3);

        assert!(picker.available().is_empty());
        assert!(!picker.start());
    }

    #[test]
    fn reset_restores_everything() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(5);

        picker.start();
        picker.stop(&mut rng);
        picker.deselect("c");
        picker.reset();

        assert!(picker.history().is_empty());
        assert_eq!(picker.available().len(), 3);
        assert!(picker.winner().is_none());
        assert!(!picker.is_rolling());
    }

    #[test]
    fn deselection_and_history_filter_identically() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(6);

        picker.deselect("a");
        picker.start();
        let winner = picker.stop(&mut rng).unwrap();
        assert_ne!(winner.id, "a");

        picker.start();
        let pool: Vec<&str> = picker.available().iter().map(|s| s.id.as_str()).collect();
        assert!(!pool.contains(&"a"));
        assert!(!pool.contains(&winner.id.as_str()));
    }

    #[test]
    fn refresh_keeps_history_but_resets_selection() {
        let mut picker = Picker::new(roster_abc(), Vec::new(), true);
        let mut rng = StdRng::seed_from_u64(7);

        picker.start();
        let winner = picker.stop(&mut rng).unwrap();

        let mut bigger = roster_abc();
        bigger.push(student("d", "刘小强"));
        picker.refresh(bigger);

        assert_eq!(picker.history().len(), 1);
        assert!(picker.winner().is_none());
        // drawn student still excluded after the reload
        assert_eq!(picker.available().len(), 3);
        assert!(!picker.available().iter().any(|s| s.id == winner.id));
    }
}
