use clipbridge_base::ClipboardKind;

/// The bridge's outgoing source slots, one per clipboard kind.
///
/// At most one live source exists per slot; installing a new one returns the
/// superseded source so the caller can decide its fate (the compositor
/// cancels superseded sources on its own).
#[derive(Debug)]
pub(crate) struct SourceSlots<S> {
    slots: [Option<S>; ClipboardKind::MAX_LENGTH],
}

impl<S> Default for SourceSlots<S> {
    fn default() -> Self { Self { slots: std::array::from_fn(|_| None) } }
}

impl<S> SourceSlots<S>
where
    S: PartialEq,
{
    pub fn install(&mut self, kind: ClipboardKind, source: S) -> Option<S> {
        self.slots[usize::from(kind)].replace(source)
    }

    /// Clears the slot holding `source`, if any, and reports which kind it
    /// served. Foreign sources leave the slots untouched.
    pub fn clear_matching(&mut self, source: &S) -> Option<ClipboardKind> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref() == Some(source) {
                *slot = None;
                return Some(ClipboardKind::from(index));
            }
        }
        None
    }

    /// Releases every active source. Empty slots are skipped, so calling
    /// this with zero, one or two active sources is safe and never yields
    /// the same source twice.
    pub fn take_all(&mut self) -> impl Iterator<Item = S> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use clipbridge_base::ClipboardKind;

    use super::SourceSlots;

    #[test]
    fn install_supersedes_only_its_own_slot() {
        let mut slots = SourceSlots::default();
        assert_eq!(slots.install(ClipboardKind::Clipboard, 1), None);
        assert_eq!(slots.install(ClipboardKind::Primary, 2), None);
        assert_eq!(slots.install(ClipboardKind::Clipboard, 3), Some(1));
        assert_eq!(slots.clear_matching(&2), Some(ClipboardKind::Primary));
    }

    #[test]
    fn cancelling_one_slot_leaves_the_other() {
        let mut slots = SourceSlots::default();
        let _unused = slots.install(ClipboardKind::Clipboard, 10);
        let _unused = slots.install(ClipboardKind::Primary, 20);

        assert_eq!(slots.clear_matching(&10), Some(ClipboardKind::Clipboard));
        // The cancelled slot is gone, the other is intact.
        assert_eq!(slots.clear_matching(&10), None);
        assert_eq!(slots.take_all().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn foreign_sources_are_ignored() {
        let mut slots: SourceSlots<u32> = SourceSlots::default();
        let _unused = slots.install(ClipboardKind::Clipboard, 10);
        assert_eq!(slots.clear_matching(&99), None);
        assert_eq!(slots.take_all().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn take_all_releases_exactly_what_is_active() {
        let mut slots: SourceSlots<u32> = SourceSlots::default();
        assert_eq!(slots.take_all().count(), 0);

        let _unused = slots.install(ClipboardKind::Primary, 7);
        assert_eq!(slots.take_all().collect::<Vec<_>>(), vec![7]);
        // A second pass finds nothing left to release.
        assert_eq!(slots.take_all().count(), 0);
    }
}
