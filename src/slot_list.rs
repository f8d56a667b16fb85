// Doubly linked list whose nodes live in a `Vec` arena and link to each other
// by slot index. An index returned by `push_front` stays valid until that same
// slot is removed; vacated slots are recycled through a free list.

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

pub(crate) struct SlotList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> SlotList<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    // Detach a node from its neighbours without vacating its slot
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    // Attach a detached node at the head
    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
            }
            // Empty list case
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    /// Inserts `value` at the front and returns its slot index.
    pub(crate) fn push_front(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    /// Unlinks the node at `idx` and hands its value back.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<T> {
        self.node(idx)?;
        self.unlink(idx);

        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.value)
    }

    pub(crate) fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) || self.node(idx).is_none() {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let idx = self.tail?;
        self.remove(idx)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.node(idx).map(|node| &node.value)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.node_mut(idx).map(|node| &mut node.value)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Walks the list from most to least recently used, yielding slot indices
    /// alongside values.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

pub(crate) struct Iter<'a, T> {
    list: &'a SlotList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.node(idx)?;
        self.cursor = node.next;
        Some((idx, &node.value))
    }
}
