use nalgebra::Point3;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

new_key_type! {
    struct EntryKey;
}

type CellKey = (i64, i64, i64);

/// Exact bit pattern of a position, with `-0.0` folded onto `0.0` so that the
/// key agrees with floating-point equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PositionKey([u64; 3]);

impl PositionKey {
    fn of(position: &Point3<f64>) -> Self {
        Self([
            (position.x + 0.0).to_bits(),
            (position.y + 0.0).to_bits(),
            (position.z + 0.0).to_bits(),
        ])
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    position: Point3<f64>,
    item: T,
}

/// A uniform-grid ("bucket") spatial hash mapping 3D positions to items.
///
/// Space is divided into cubic cells of side `cell_size`; each instantiated cell
/// owns the list of entries whose position falls inside it. Radius queries visit
/// every cell overlapping the axis-aligned cube around the query point and check
/// exact distances, so their cost is independent of the total number of items
/// as long as the local density is bounded.
///
/// At most one item is stored per exact position: inserting at a position that
/// is already occupied replaces the previous item. Cells are created lazily on
/// first insert and are kept for the lifetime of the index.
///
/// Choose a cell size a little below the typical query radius. Much larger cells
/// make every query scan many far-away entries; much smaller cells make every
/// query visit many empty cells.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    cell_size: f64,
    entries: SlotMap<EntryKey, Entry<T>>,
    positions: HashMap<PositionKey, EntryKey>,
    cells: HashMap<CellKey, Vec<EntryKey>>,
}

impl<T> SpatialIndex<T> {
    /// Creates an empty index.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not a finite, strictly positive number.
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "SpatialIndex cell size must be finite and positive, got {cell_size}"
        );
        Self {
            cell_size,
            entries: SlotMap::with_key(),
            positions: HashMap::new(),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cells instantiated so far (including cells emptied by removal).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Stores `item` at `position`.
    ///
    /// # Return
    ///
    /// The item previously stored at exactly the same position, if any.
    pub fn insert(&mut self, position: Point3<f64>, item: T) -> Option<T> {
        let key = PositionKey::of(&position);
        if let Some(&entry_key) = self.positions.get(&key) {
            let entry = &mut self.entries[entry_key];
            return Some(std::mem::replace(&mut entry.item, item));
        }

        let cell = self.cell_of(&position);
        let entry_key = self.entries.insert(Entry { position, item });
        self.positions.insert(key, entry_key);
        self.cells.entry(cell).or_default().push(entry_key);
        None
    }

    /// Removes the item stored at exactly `position`.
    ///
    /// Removing a position that holds nothing is a no-op.
    pub fn remove(&mut self, position: &Point3<f64>) -> Option<T> {
        let entry_key = self.positions.remove(&PositionKey::of(position))?;
        let entry = self.entries.remove(entry_key)?;
        if let Some(cell) = self.cells.get_mut(&self.cell_of(&entry.position)) {
            if let Some(slot) = cell.iter().position(|&k| k == entry_key) {
                cell.swap_remove(slot);
            }
        }
        Some(entry.item)
    }

    /// The item stored at exactly `position`.
    pub fn get(&self, position: &Point3<f64>) -> Option<&T> {
        let entry_key = self.positions.get(&PositionKey::of(position))?;
        self.entries.get(*entry_key).map(|entry| &entry.item)
    }

    pub fn get_mut(&mut self, position: &Point3<f64>) -> Option<&mut T> {
        let entry_key = self.positions.get(&PositionKey::of(position))?;
        self.entries.get_mut(*entry_key).map(|entry| &mut entry.item)
    }

    pub fn contains_position(&self, position: &Point3<f64>) -> bool {
        self.positions.contains_key(&PositionKey::of(position))
    }

    /// Iterates over all `(position, item)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point3<f64>, &T)> {
        self.entries
            .values()
            .map(|entry| (&entry.position, &entry.item))
    }

    /// Removes every item and every cell.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
        self.cells.clear();
    }

    /// Returns the item nearest to `position` whose distance is at most `radius`.
    ///
    /// When several items share the minimum distance, the first one visited wins.
    pub fn find_closest_within_radius(&self, position: &Point3<f64>, radius: f64) -> Option<&T> {
        let mut closest: Option<(&T, f64)> = None;
        self.visit_within_radius(position, radius, |entry, distance_sq| {
            if closest.is_none_or(|(_, best)| distance_sq < best) {
                closest = Some((&entry.item, distance_sq));
            }
        });
        closest.map(|(item, _)| item)
    }

    /// Returns every item whose distance to `position` is at most `radius`, in
    /// unspecified order.
    pub fn find_all_within_radius(&self, position: &Point3<f64>, radius: f64) -> Vec<&T> {
        let mut found = Vec::new();
        self.visit_within_radius(position, radius, |entry, _| found.push(&entry.item));
        found
    }

    /// Like [`find_all_within_radius`](Self::find_all_within_radius), but also
    /// returns the stored position of each item.
    pub fn neighbors_within_radius(
        &self,
        position: &Point3<f64>,
        radius: f64,
    ) -> Vec<(&Point3<f64>, &T)> {
        let mut found = Vec::new();
        self.visit_within_radius(position, radius, |entry, _| {
            found.push((&entry.position, &entry.item))
        });
        found
    }

    fn cell_index(&self, coordinate: f64) -> i64 {
        (coordinate / self.cell_size).floor() as i64
    }

    fn cell_of(&self, position: &Point3<f64>) -> CellKey {
        (
            self.cell_index(position.x),
            self.cell_index(position.y),
            self.cell_index(position.z),
        )
    }

    /// Calls `visit(entry, squared_distance)` for each entry within `radius`.
    fn visit_within_radius<'a, F>(&'a self, position: &Point3<f64>, radius: f64, mut visit: F)
    where
        F: FnMut(&'a Entry<T>, f64),
    {
        // Also rejects NaN.
        if !(radius >= 0.0) || !position.iter().all(|c| c.is_finite()) {
            return;
        }
        let radius_sq = radius * radius;

        let min = (
            self.cell_index(position.x - radius),
            self.cell_index(position.y - radius),
            self.cell_index(position.z - radius),
        );
        let max = (
            self.cell_index(position.x + radius),
            self.cell_index(position.y + radius),
            self.cell_index(position.z + radius),
        );

        let entries = &self.entries;
        let mut scan_cell = |cell: &'a [EntryKey]| {
            for &entry_key in cell {
                let entry = &entries[entry_key];
                let distance_sq = (entry.position - position).norm_squared();
                if distance_sq <= radius_sq {
                    visit(entry, distance_sq);
                }
            }
        };

        let span = |lo: i64, hi: i64| (hi as i128 - lo as i128 + 1) as u128;
        let cube_cells = span(min.0, max.0)
            .saturating_mul(span(min.1, max.1))
            .saturating_mul(span(min.2, max.2));

        if cube_cells > self.cells.len() as u128 {
            // The query cube is larger than the occupied grid; walk occupied cells instead.
            for (&(x, y, z), cell) in &self.cells {
                let inside = (min.0..=max.0).contains(&x)
                    && (min.1..=max.1).contains(&y)
                    && (min.2..=max.2).contains(&z);
                if inside {
                    scan_cell(cell.as_slice());
                }
            }
            return;
        }

        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    if let Some(cell) = self.cells.get(&(x, y, z)) {
                        scan_cell(cell.as_slice());
                    }
                }
            }
        }
    }
}
