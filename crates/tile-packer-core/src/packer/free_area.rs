use crate::config::SortMetric;
use crate::error::Result;
use crate::model::Rect;

/// An empty rectangle inside the canvas.
///
/// Areas live in the slots of a [`FreeAreaPool`] and are chained into a list sorted by
/// ascending `key`. `prev`/`next` are slot indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeArea {
    rect: Rect,
    key: u64,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl FreeArea {
    pub fn rect(&self) -> Rect {
        self.rect
    }
    pub fn key(&self) -> u64 {
        self.key
    }
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

/// Fixed-capacity arena of free areas exposed as a sorted doubly-linked list.
///
/// Placing a tile creates at most one new area (the area it lands in is reused for one of
/// the leftovers), so `tile_count + 1` slots always suffice for a canvas pass. Slots freed by
/// exact fits and merges go to a spare stack and are handed out again before the high-water
/// mark moves.
#[derive(Debug)]
pub struct FreeAreaPool {
    slots: Vec<FreeArea>,
    spare: Vec<usize>,
    capacity: usize,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    metric: SortMetric,
}

impl FreeAreaPool {
    /// Reserves storage for `capacity` areas up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        let mut spare = Vec::new();
        spare.try_reserve_exact(capacity)?;
        Ok(Self {
            slots,
            spare,
            capacity,
            head: None,
            tail: None,
            len: 0,
            metric: SortMetric::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots handed out since the last reset.
    pub fn high_water(&self) -> usize {
        self.slots.len()
    }

    /// Number of linked areas.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn metric(&self) -> SortMetric {
        self.metric
    }

    /// Changes the ordering metric. Only takes effect on the next `reset`.
    pub fn set_metric(&mut self, metric: SortMetric) {
        self.metric = metric;
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn get(&self, idx: usize) -> &FreeArea {
        &self.slots[idx]
    }

    pub fn prev_of(&self, idx: usize) -> Option<usize> {
        self.slots[idx].prev
    }

    /// Linked areas from smallest to largest key.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            pool: self,
            cur: self.head,
        }
    }

    /// Summed area of all linked free rectangles.
    pub fn total_area(&self) -> u64 {
        self.iter().map(|(_, a)| a.rect.area()).sum()
    }

    /// Drops every area and starts over with a single area covering a `width x height` canvas.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.slots.clear();
        self.spare.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        let root = self.alloc(Rect::new(0, 0, width, height));
        self.insert_sorted(root, None);
    }

    /// True while the pool still holds the whole, untouched canvas.
    pub fn is_untouched(&self, width: u32, height: u32) -> bool {
        self.head
            .map(|h| {
                let r = self.slots[h].rect;
                r.x == 0 && r.y == 0 && r.w == width && r.h == height
            })
            .unwrap_or(false)
    }

    /// Hands out an unlinked slot holding `rect`, preferring reclaimed slots.
    pub fn alloc(&mut self, rect: Rect) -> usize {
        let area = FreeArea {
            rect,
            key: self.metric.key(rect.w, rect.h),
            ..Default::default()
        };
        if let Some(idx) = self.spare.pop() {
            self.slots[idx] = area;
            return idx;
        }
        debug_assert!(self.slots.len() < self.capacity, "free area arena exhausted");
        self.slots.push(area);
        self.slots.len() - 1
    }

    /// Returns an unlinked slot to the spare stack.
    pub fn release(&mut self, idx: usize) {
        debug_assert!(!self.slots[idx].linked);
        self.spare.push(idx);
    }

    /// Links `idx` into the list.
    ///
    /// The search walks backwards from `hint` and inserts right after the first area with a
    /// strictly smaller key; running off the front makes `idx` the new head. Every area after
    /// `hint` must have a key >= the key of `idx`. `None` means "start at the front", pass
    /// `self.tail()` to search the whole list.
    pub fn insert_sorted(&mut self, idx: usize, hint: Option<usize>) {
        debug_assert!(!self.slots[idx].linked);
        let key = self.slots[idx].key;
        let mut cur = hint;
        while let Some(c) = cur {
            if self.slots[c].key < key {
                let next = self.slots[c].next;
                self.slots[idx].prev = Some(c);
                self.slots[idx].next = next;
                self.slots[c].next = Some(idx);
                match next {
                    Some(n) => self.slots[n].prev = Some(idx),
                    None => self.tail = Some(idx),
                }
                self.slots[idx].linked = true;
                self.len += 1;
                return;
            }
            cur = self.slots[c].prev;
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        match self.head {
            Some(h) => self.slots[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.slots[idx].linked = true;
        self.len += 1;
    }

    /// Unlinks `idx` in O(1). The slot keeps its rectangle so the caller can reuse it.
    pub fn delist(&mut self, idx: usize) {
        if !self.slots[idx].linked {
            return;
        }
        let FreeArea { prev, next, .. } = self.slots[idx];
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        let area = &mut self.slots[idx];
        area.prev = None;
        area.next = None;
        area.linked = false;
        self.len -= 1;
    }

    /// Unlinks `idx` and reclaims its slot.
    pub fn remove(&mut self, idx: usize) {
        self.delist(idx);
        self.release(idx);
    }

    /// Grows the unlinked area `idx` by absorbing linked neighbours that share a full edge
    /// with it, until no neighbour qualifies. Absorbed areas are unlinked and reclaimed.
    ///
    /// The key of `idx` is left stale; call [`Self::refresh_key`] before re-inserting.
    pub fn merge_adjacent(&mut self, idx: usize) -> bool {
        let mut merged = false;
        'scan: loop {
            let mut cur = self.head;
            while let Some(c) = cur {
                let next = self.slots[c].next;
                if c != idx {
                    if let Some(joined) = join(self.slots[idx].rect, self.slots[c].rect) {
                        self.slots[idx].rect = joined;
                        self.remove(c);
                        merged = true;
                        continue 'scan;
                    }
                }
                cur = next;
            }
            return merged;
        }
    }

    pub fn refresh_key(&mut self, idx: usize) {
        let r = self.slots[idx].rect;
        self.slots[idx].key = self.metric.key(r.w, r.h);
    }

    /// Replaces the rectangle of linked area `idx` with the smaller `remaining` and moves it to
    /// its new sorted position, merging with neighbours on the way.
    pub fn shrink(&mut self, idx: usize, remaining: Rect) {
        let prev = self.slots[idx].prev;
        self.delist(idx);
        self.slots[idx].rect = remaining;
        let hint = if self.merge_adjacent(idx) {
            self.tail
        } else {
            prev
        };
        self.refresh_key(idx);
        self.insert_sorted(idx, hint);
    }

    /// Carves a `w x h` tile out of the top-left corner of linked area `idx`.
    ///
    /// Requires `w < area.w` and `h < area.h`. The leftover is cut into two pieces along the
    /// axis that keeps the larger piece as large as possible: `idx` is reused for the piece
    /// spanning the full width or height, a new slot holds the other one.
    pub fn split(&mut self, idx: usize, w: u32, h: u32) {
        let area = self.slots[idx].rect;
        debug_assert!(w < area.w && h < area.h);
        let remaining_w = area.w - w;
        let remaining_h = area.h - h;
        let (rest, piece) = if remaining_w > remaining_h {
            (
                Rect::new(area.x + w, area.y, remaining_w, area.h),
                Rect::new(area.x, area.y + h, w, remaining_h),
            )
        } else {
            (
                Rect::new(area.x, area.y + h, area.w, remaining_h),
                Rect::new(area.x + w, area.y, remaining_w, h),
            )
        };

        let original_prev = self.slots[idx].prev;
        self.delist(idx);
        self.slots[idx].rect = rest;
        let new = self.alloc(piece);

        let merged_rest = self.merge_adjacent(idx);
        let merged_piece = self.merge_adjacent(new);
        self.refresh_key(idx);
        self.refresh_key(new);

        // Unmerged pieces are sub-rectangles of the split area, so they can never sort past
        // its old position. A merged piece may, hence the full search from the tail.
        let hint = if merged_rest || merged_piece {
            self.tail
        } else {
            original_prev
        };
        let (big, small) = if self.slots[new].key > self.slots[idx].key {
            (new, idx)
        } else {
            (idx, new)
        };
        self.insert_sorted(big, hint);
        let hint = self.slots[big].prev;
        self.insert_sorted(small, hint);
    }

    /// Smallest area (by key) that can hold a `w x h` rectangle.
    pub fn find_fit(&self, w: u32, h: u32) -> Option<usize> {
        self.iter()
            .find(|(_, a)| a.rect.w >= w && a.rect.h >= h)
            .map(|(idx, _)| idx)
    }
}

/// Union of two rectangles sharing a full edge.
fn join(a: Rect, b: Rect) -> Option<Rect> {
    if a.y == b.y && a.h == b.h {
        if b.x + b.w == a.x {
            return Some(Rect::new(b.x, a.y, a.w + b.w, a.h));
        }
        if a.x + a.w == b.x {
            return Some(Rect::new(a.x, a.y, a.w + b.w, a.h));
        }
    }
    if a.x == b.x && a.w == b.w {
        if b.y + b.h == a.y {
            return Some(Rect::new(a.x, b.y, a.w, a.h + b.h));
        }
        if a.y + a.h == b.y {
            return Some(Rect::new(a.x, a.y, a.w, a.h + b.h));
        }
    }
    None
}

pub struct Iter<'a> {
    pool: &'a FreeAreaPool,
    cur: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a FreeArea);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cur?;
        let area = &self.pool.slots[idx];
        self.cur = area.next;
        Some((idx, area))
    }
}
