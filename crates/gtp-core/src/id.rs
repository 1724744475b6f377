use rand::Rng;
use std::fmt;

/// Decimal column width every rendered [`CommandId`] occupies in the command
/// log text. Fixed crate-wide so in-place id rewrites never change a
/// command's byte offsets.
pub const ID_WIDTH: usize = 10;

const REPLY_BIT: u32 = 1;
const ORDINAL_SHIFT: u32 = 1;
const ORDINAL_MASK: u32 = 0xFFFF;
const NONCE_SHIFT: u32 = 17;
const NONCE_MASK: u32 = 0x7FFF;

/// A command id: a move ordinal and a reply-required flag packed into one
/// 32-bit value, perturbed by a random nonce so a freshly issued id never
/// collides with the one it replaces.
///
/// Layout (LSB first): bit 0 is the reply-required flag, bits 1..=16 are the
/// move ordinal (truncated to 16 bits), bits 17..=31 are the nonce.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CommandId(u32);

impl CommandId {
    /// Wraps a raw 32-bit value parsed off the wire (e.g. a slave's reply id).
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// The move ordinal this id was issued for.
    pub fn ordinal(self) -> u32 {
        (self.0 >> ORDINAL_SHIFT) & ORDINAL_MASK
    }

    /// The perturbation nonce baked into this id.
    pub fn nonce(self) -> u32 {
        self.0 >> NONCE_SHIFT
    }

    pub fn reply_required(self) -> bool {
        self.0 & REPLY_BIT != 0
    }

    /// Builds a fresh reply-required id for `move_ordinal`, rerolling the
    /// nonce until it differs from `previous` (if any).
    pub fn force_reply(move_ordinal: u32, previous: Option<CommandId>) -> Self {
        let ordinal_bits = (move_ordinal & ORDINAL_MASK) << ORDINAL_SHIFT;
        let mut rng = rand::rng();
        loop {
            let nonce = rng.random::<u16>() as u32 & NONCE_MASK;
            let candidate = (nonce << NONCE_SHIFT) | ordinal_bits | REPLY_BIT;
            if previous.map_or(true, |p| p.0 != candidate) {
                return Self(candidate);
            }
        }
    }

    /// Clears the reply-required flag, leaving ordinal and nonce untouched.
    pub fn prevent_reply(self) -> Self {
        Self(self.0 & !REPLY_BIT)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = ID_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_reply_sets_flag() {
        let id = CommandId::force_reply(3, None);
        assert!(id.reply_required());
        assert_eq!(id.ordinal(), 3);
    }

    #[test]
    fn prevent_reply_clears_flag_only() {
        let id = CommandId::force_reply(7, None);
        let cleared = id.prevent_reply();
        assert!(!cleared.reply_required());
        assert_eq!(cleared.ordinal(), id.ordinal());
        assert_eq!(cleared.nonce(), id.nonce());
    }

    #[test]
    fn force_reply_differs_from_previous() {
        let first = CommandId::force_reply(1, None);
        for _ in 0..64 {
            let next = CommandId::force_reply(1, Some(first));
            assert_ne!(next.raw(), first.raw());
        }
    }

    #[test]
    fn display_is_fixed_width() {
        let narrow = CommandId::from_raw(1);
        let wide = CommandId::from_raw(u32::MAX);
        assert_eq!(narrow.to_string().len(), ID_WIDTH);
        assert_eq!(wide.to_string().len(), ID_WIDTH);
    }

    #[test]
    fn ordinal_wraps_at_16_bits() {
        let id = CommandId::force_reply(0x1_FFFF, None);
        assert_eq!(id.ordinal(), 0xFFFF);
    }
}
