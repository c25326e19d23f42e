//! Generational slot pools
//!
//! Scene entities (actors, parallax layers, tilemaps) live in small
//! fixed-capacity pools and are referred to by generation-counted handles.
//! A handle holds the slot index plus the generation the slot had when the
//! handle was created; freeing a slot bumps its generation, so stale handles
//! fail the generation check instead of silently aliasing a recycled entity.
//!
//! Capacity exhaustion and stale handles are not errors here: `insert`
//! returns `None` when the pool is full and lookups return `None` for dead
//! handles. Callers translate that into the sentinel/no-op behavior the
//! public API promises.

/// Handle into a [`Pool`]: slot index plus generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Id {
    pub index: u16,
    pub generation: u16,
}

impl Id {
    /// Sentinel for "no entity"
    pub const NULL: Id = Id {
        index: u16::MAX,
        generation: u16::MAX,
    };

    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Id::NULL
    }
}

impl Default for Id {
    fn default() -> Self {
        Id::NULL
    }
}

/// Fixed-capacity pool of `T` addressed by generation-counted [`Id`]s.
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u16>,
    free: Vec<u16>,
    capacity: usize,
}

impl<T> Pool<T> {
    /// Create an empty pool that will never hold more than `capacity` items
    pub fn with_capacity(capacity: usize) -> Pool<T> {
        Pool {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Insert a value, returning its handle, or `None` if the pool is full
    pub fn insert(&mut self, value: T) -> Option<Id> {
        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.slots[i] = Some(value);
            return Some(Id {
                index,
                generation: self.generations[i],
            });
        }

        if self.slots.len() >= self.capacity {
            return None;
        }

        let index = self.slots.len() as u16;
        self.slots.push(Some(value));
        self.generations.push(0);
        Some(Id {
            index,
            generation: 0,
        })
    }

    /// Remove and return the value for `id`, if the handle is still live
    pub fn remove(&mut self, id: Id) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let i = id.index as usize;
        // Retire this generation so outstanding handles go stale
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(id.index);
        self.slots[i].take()
    }

    /// True if `id` refers to a live slot
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        let i = id.index as usize;
        i < self.slots.len() && self.generations[i] == id.generation && self.slots[i].is_some()
    }

    #[inline]
    pub fn get(&self, id: Id) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].as_mut()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live entries in slot order (stable across frames while no
    /// insert/remove happens, which is what the render queue's tie-break
    /// ordering relies on)
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|v| {
                (
                    Id {
                        index: i as u16,
                        generation: self.generations[i],
                    },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> {
        let generations = &self.generations;
        self.slots.iter_mut().enumerate().filter_map(move |(i, slot)| {
            slot.as_mut().map(|v| {
                (
                    Id {
                        index: i as u16,
                        generation: generations[i],
                    },
                    v,
                )
            })
        })
    }

    /// Drop every entry and invalidate all outstanding handles
    pub fn clear(&mut self) {
        for i in 0..self.slots.len() {
            if self.slots[i].is_some() {
                self.slots[i] = None;
                self.generations[i] = self.generations[i].wrapping_add(1);
                self.free.push(i as u16);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let mut pool: Pool<i32> = Pool::with_capacity(4);
        let a = pool.insert(10).unwrap();
        let b = pool.insert(20).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.get(a), Some(&10));
        assert_eq!(pool.get(b), Some(&20));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_capacity_limit() {
        let mut pool: Pool<i32> = Pool::with_capacity(2);
        assert!(pool.insert(1).is_some());
        assert!(pool.insert(2).is_some());
        assert!(pool.insert(3).is_none());
        // Freeing a slot makes room again
        let first = pool.iter().next().unwrap().0;
        pool.remove(first);
        assert!(pool.insert(4).is_some());
    }

    #[test]
    fn test_stale_handle() {
        let mut pool: Pool<i32> = Pool::with_capacity(4);
        let a = pool.insert(10).unwrap();
        assert_eq!(pool.remove(a), Some(10));
        assert!(pool.get(a).is_none());
        assert!(!pool.contains(a));

        // Slot gets reused with a new generation; old handle stays dead
        let b = pool.insert(99).unwrap();
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(b), Some(&99));
    }

    #[test]
    fn test_null_handle() {
        let pool: Pool<i32> = Pool::with_capacity(4);
        assert!(Id::NULL.is_null());
        assert!(pool.get(Id::NULL).is_none());
    }

    #[test]
    fn test_clear_invalidates() {
        let mut pool: Pool<i32> = Pool::with_capacity(4);
        let a = pool.insert(1).unwrap();
        let b = pool.insert(2).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert!(pool.get(a).is_none());
        assert!(pool.get(b).is_none());
        assert!(pool.insert(3).is_some());
    }

    #[test]
    fn test_iter_slot_order() {
        let mut pool: Pool<char> = Pool::with_capacity(8);
        let a = pool.insert('a').unwrap();
        let _b = pool.insert('b').unwrap();
        let _c = pool.insert('c').unwrap();
        pool.remove(a);
        let order: Vec<char> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(order, vec!['b', 'c']);
    }
}
