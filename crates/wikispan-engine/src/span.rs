//! The span table of a document.
//!
//! Every construct that has been discovered (and so may have a view handed
//! out for it) owns a slot holding its byte range in the shared buffer. A
//! detached construct frees its slot for reuse; the slot's generation moves
//! on, so a view still holding the old [`SpanId`] reads as detached forever.
//! Each kind keeps a list of its live ids ordered by
//! `(start ascending, end descending)`, so an outer construct comes before
//! the constructs it contains. Edits and queries walk these lists, never the
//! freed slots.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::ops::Range;

use log::debug;
use wikispan_syntax::ConstructKind;

use crate::adjust::{self, Adjusted, Edit};

/// Identity of a registered span. Two views are the same construct exactly
/// when they share a document and a `SpanId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId {
    index: u32,
    generation: u32,
    kind: Option<ConstructKind>,
}

impl SpanId {
    /// The kind the span was registered as; `None` for a plain document.
    pub fn kind(self) -> Option<ConstructKind> {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Root,
    Live,
    Free,
}

#[derive(Debug, Clone)]
struct Slot {
    range: Range<usize>,
    generation: u32,
    state: SlotState,
}

#[derive(Debug, Default)]
struct KindList {
    ids: Vec<SpanId>,
    /// Detached ids or out-of-order entries may be present.
    stale: bool,
}

#[derive(Debug)]
pub(crate) struct SpanTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    lists: HashMap<ConstructKind, KindList>,
    root_kind: Option<ConstructKind>,
}

fn live_slot(slots: &[Slot], id: SpanId) -> Option<&Slot> {
    slots
        .get(id.index as usize)
        .filter(|slot| slot.generation == id.generation && slot.state != SlotState::Free)
}

fn sort_key(slots: &[Slot], id: SpanId) -> (usize, Reverse<usize>) {
    live_slot(slots, id).map_or((usize::MAX, Reverse(0)), |slot| {
        (slot.range.start, Reverse(slot.range.end))
    })
}

impl SpanTable {
    /// A table holding only the root span, covering `0..len`.
    pub(crate) fn new(root_kind: Option<ConstructKind>, len: usize) -> Self {
        let mut table = Self {
            slots: vec![Slot {
                range: 0..len,
                generation: 0,
                state: SlotState::Root,
            }],
            free: Vec::new(),
            lists: HashMap::new(),
            root_kind,
        };
        if let Some(kind) = root_kind {
            let root = table.root();
            table.lists.entry(kind).or_default().ids.push(root);
        }
        table
    }

    pub(crate) fn root(&self) -> SpanId {
        SpanId {
            index: 0,
            generation: 0,
            kind: self.root_kind,
        }
    }

    /// The span's current range; `None` once detached.
    pub(crate) fn range(&self, id: SpanId) -> Option<Range<usize>> {
        live_slot(&self.slots, id).map(|slot| slot.range.clone())
    }

    pub(crate) fn is_root(&self, id: SpanId) -> bool {
        live_slot(&self.slots, id).is_some_and(|slot| slot.state == SlotState::Root)
    }

    /// Drop detached ids and restore the order of one kind's list.
    fn normalize(&mut self, kind: ConstructKind) {
        let Self { slots, lists, .. } = self;
        if let Some(list) = lists.get_mut(&kind)
            && list.stale
        {
            list.ids.retain(|id| live_slot(slots, *id).is_some());
            list.ids.sort_by_key(|id| sort_key(slots, *id));
            list.stale = false;
        }
    }

    fn normalize_all(&mut self) {
        let kinds: Vec<ConstructKind> = self.lists.keys().copied().collect();
        for kind in kinds {
            self.normalize(kind);
        }
    }

    /// The live spans of `kind`, outer first.
    pub(crate) fn ids(&mut self, kind: ConstructKind) -> Vec<SpanId> {
        self.normalize(kind);
        self.lists
            .get(&kind)
            .map(|list| list.ids.clone())
            .unwrap_or_default()
    }

    /// The live spans of `kind` that lie within `region`.
    pub(crate) fn ids_within(&mut self, kind: ConstructKind, region: &Range<usize>) -> Vec<SpanId> {
        self.normalize(kind);
        let Some(list) = self.lists.get(&kind) else {
            return Vec::new();
        };
        let from = list
            .ids
            .partition_point(|id| sort_key(&self.slots, *id).0 < region.start);
        list.ids[from..]
            .iter()
            .copied()
            .take_while(|id| sort_key(&self.slots, *id).0 <= region.end)
            .filter(|id| self.range(*id).is_some_and(|range| range.end <= region.end))
            .collect()
    }

    /// Position in the kind's list where a span with this range belongs.
    fn position(slots: &[Slot], list: &KindList, range: &Range<usize>) -> usize {
        let key = (range.start, Reverse(range.end));
        list.ids.partition_point(|id| sort_key(slots, *id) < key)
    }

    /// The live span of `kind` with exactly this range.
    pub(crate) fn lookup(&mut self, kind: ConstructKind, range: &Range<usize>) -> Option<SpanId> {
        self.normalize(kind);
        let list = self.lists.get(&kind)?;
        let at = Self::position(&self.slots, list, range);
        list.ids
            .get(at)
            .copied()
            .filter(|id| self.range(*id).as_ref() == Some(range))
    }

    /// Register a span, or return the live span already registered for the
    /// same kind and range.
    pub(crate) fn register(&mut self, kind: ConstructKind, range: Range<usize>) -> SpanId {
        if let Some(id) = self.lookup(kind, &range) {
            return id;
        }
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.range = range.clone();
                slot.state = SlotState::Live;
                index
            }
            None => {
                self.slots.push(Slot {
                    range: range.clone(),
                    generation: 0,
                    state: SlotState::Live,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let id = SpanId {
            index,
            generation: self.slots[index as usize].generation,
            kind: Some(kind),
        };
        let list = self.lists.entry(kind).or_default();
        let at = Self::position(&self.slots, list, &range);
        list.ids.insert(at, id);
        id
    }

    /// Free a live slot. Its ids go stale through the generation bump.
    fn release(slots: &mut [Slot], free: &mut Vec<u32>, index: u32) {
        let slot = &mut slots[index as usize];
        slot.state = SlotState::Free;
        slot.generation = slot.generation.wrapping_add(1);
        free.push(index);
    }

    /// Detach a span. The root can't be detached.
    pub(crate) fn detach(&mut self, id: SpanId) -> bool {
        if !live_slot(&self.slots, id).is_some_and(|slot| slot.state == SlotState::Live) {
            return false;
        }
        Self::release(&mut self.slots, &mut self.free, id.index);
        if let Some(kind) = id.kind
            && let Some(list) = self.lists.get_mut(&kind)
        {
            list.stale = true;
        }
        true
    }

    /// Live spans of any kind whose range contains `range`.
    pub(crate) fn containing(&mut self, range: &Range<usize>) -> Vec<(SpanId, Range<usize>)> {
        self.normalize_all();
        let mut found = Vec::new();
        for list in self.lists.values() {
            let end = list
                .ids
                .partition_point(|id| sort_key(&self.slots, *id).0 <= range.start);
            found.extend(list.ids[..end].iter().filter_map(|id| {
                let span = self.range(*id)?;
                (range.end <= span.end).then_some((*id, span))
            }));
        }
        found
    }

    /// Ranges of the live spans of `kind` that overlap or touch `range`.
    pub(crate) fn touching(&mut self, kind: ConstructKind, range: &Range<usize>) -> Vec<Range<usize>> {
        self.normalize(kind);
        let Some(list) = self.lists.get(&kind) else {
            return Vec::new();
        };
        let upto = list
            .ids
            .partition_point(|id| sort_key(&self.slots, *id).0 <= range.end);
        list.ids[..upto]
            .iter()
            .filter_map(|id| self.range(*id))
            .filter(|span| span.end >= range.start)
            .collect()
    }

    /// Live spans of any kind that lie within `range`.
    pub(crate) fn within(&mut self, range: &Range<usize>) -> Vec<(SpanId, Range<usize>)> {
        let kinds: Vec<ConstructKind> = self.lists.keys().copied().collect();
        let mut found = Vec::new();
        for kind in kinds {
            for id in self.ids_within(kind, range) {
                if let Some(span) = self.range(id) {
                    found.push((id, span));
                }
            }
        }
        found
    }

    /// Apply an edit made through the view `owner` to every live span.
    /// Returns the spans removed by the edit with their last ranges.
    pub(crate) fn apply_edit(
        &mut self,
        edit: &Edit,
        owner: SpanId,
        new_len: usize,
    ) -> Vec<(SpanId, Range<usize>)> {
        let owner_range = self.range(owner).unwrap_or_default();
        self.slots[0].range = 0..new_len;

        let Self {
            slots, free, lists, ..
        } = self;
        let mut removed = Vec::new();
        for list in lists.values_mut() {
            let mut moved = false;
            for id in &list.ids {
                let Some(slot) = slots
                    .get_mut(id.index as usize)
                    .filter(|slot| slot.generation == id.generation && slot.state == SlotState::Live)
                else {
                    continue;
                };
                let contains =
                    slot.range.start <= owner_range.start && owner_range.end <= slot.range.end;
                let owns_edit = *id == owner || (contains && slot.range != owner_range);
                match adjust::adjust(slot.range.clone(), edit, owns_edit) {
                    Adjusted::Kept(range) => {
                        if range != slot.range {
                            slot.range = range;
                            moved = true;
                        }
                    }
                    Adjusted::Removed => {
                        debug!(
                            "edit at {:?} removed {} at {:?}",
                            edit.removed,
                            id.kind.map_or("text", |k| k.name()),
                            slot.range
                        );
                        removed.push((*id, slot.range.clone()));
                        Self::release(slots, free, id.index);
                        moved = true;
                    }
                }
            }
            if moved {
                list.stale = true;
            }
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state != SlotState::Free)
            .count()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
