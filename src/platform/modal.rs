//! Queue of modal prompts the host displays and answers

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub id: ModalId,
    pub title: String,
    pub body: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ModalQueue {
    open: VecDeque<Modal>,
    answers: HashMap<ModalId, usize>,
    next_id: u32,
}

impl ModalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_modal(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        actions: Vec<String>,
    ) -> ModalId {
        self.next_id = self.next_id.wrapping_add(1);
        let modal = Modal {
            id: ModalId(self.next_id),
            title: title.into(),
            body: body.into(),
            actions,
        };
        log::debug!("Modal {:?}: {}", modal.id, modal.title);
        let id = modal.id;
        self.open.push_back(modal);
        id
    }

    /// Oldest unanswered modal
    pub fn current(&self) -> Option<&Modal> {
        self.open.front()
    }

    pub fn open_modals(&self) -> impl Iterator<Item = &Modal> {
        self.open.iter()
    }

    pub fn is_open(&self, id: ModalId) -> bool {
        self.open.iter().any(|m| m.id == id)
    }

    /// Answer a modal with one of its actions. Closes it.
    pub fn respond(&mut self, id: ModalId, action: usize) -> bool {
        let Some(pos) = self.open.iter().position(|m| m.id == id) else {
            return false;
        };
        if action >= self.open[pos].actions.len() {
            return false;
        }
        self.open.remove(pos);
        self.answers.insert(id, action);
        true
    }

    /// Close without an answer
    pub fn dismiss(&mut self, id: ModalId) {
        self.open.retain(|m| m.id != id);
        self.answers.remove(&id);
    }

    pub fn take_response(&mut self, id: ModalId) -> Option<usize> {
        self.answers.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> Vec<String> {
        vec!["Yes".into(), "No".into()]
    }

    #[test]
    fn test_show_and_respond() {
        let mut modals = ModalQueue::new();
        let first = modals.show_modal("One", "body", actions());
        let second = modals.show_modal("Two", "body", actions());
        assert_eq!(modals.current().map(|m| m.id), Some(first));

        assert!(!modals.respond(second, 5));
        assert!(modals.respond(second, 1));
        assert!(!modals.is_open(second));
        assert!(!modals.respond(second, 0));

        assert_eq!(modals.take_response(second), Some(1));
        assert_eq!(modals.take_response(second), None);
        assert_eq!(modals.take_response(first), None);
    }

    #[test]
    fn test_dismiss() {
        let mut modals = ModalQueue::new();
        let id = modals.show_modal("Gamepad connected!", "[0] pad", actions());
        modals.dismiss(id);
        assert!(modals.current().is_none());
        assert_eq!(modals.take_response(id), None);
    }
}
