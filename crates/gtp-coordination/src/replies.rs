/// Per-slave replies to the *current* command, reset whenever the
/// Coordinator installs a new tail command.
#[derive(Default)]
pub struct ReplyBuffer {
    replies: Vec<String>,
    capacity: usize,
}

impl ReplyBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            replies: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn reset(&mut self) {
        self.replies.clear();
    }

    /// Deposits a reply in arrival order. Oversize reply sets are bounded:
    /// once `capacity` replies have been collected for this command,
    /// further arrivals are dropped rather than reallocating (spec.md §5
    /// resource caps).
    pub fn push(&mut self, reply: String) {
        if self.capacity == 0 || self.replies.len() < self.capacity {
            self.replies.push(reply);
        } else {
            log::warn!("reply buffer full ({} replies), dropping late reply", self.capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.replies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_replies() {
        let mut buf = ReplyBuffer::with_capacity(4);
        buf.push("a".into());
        buf.reset();
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn replies_kept_in_arrival_order() {
        let mut buf = ReplyBuffer::with_capacity(4);
        buf.push("first".into());
        buf.push("second".into());
        assert_eq!(buf.as_slice(), ["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn oversize_replies_are_dropped_not_reallocated() {
        let mut buf = ReplyBuffer::with_capacity(2);
        buf.push("a".into());
        buf.push("b".into());
        buf.push("c".into());
        assert_eq!(buf.len(), 2);
    }
}
