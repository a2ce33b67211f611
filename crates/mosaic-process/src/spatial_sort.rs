use glam::Vec3;

/// Normal of the sort plane, off every coordinate axis.
pub(crate) const PLANE_NORMAL: Vec3 = Vec3::new(0.8523, 0.0004, 0.5223);

#[derive(Debug, Clone, Copy)]
struct Entry {
    index: u32,
    position: Vec3,
    distance: f32,
}

/// Positions sorted by their signed distance to a plane through the origin.
///
/// Two points closer than `r` to each other are also closer than `r` along the
/// sort key, so a radius query only needs to scan a contiguous key range.
#[derive(Debug, Clone)]
pub struct SpatialSort {
    normal: Vec3,
    entries: Vec<Entry>,
}

impl SpatialSort {
    pub fn new(positions: &[Vec3]) -> Self {
        let normal = PLANE_NORMAL.normalize();
        let mut entries: Vec<Entry> = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Entry {
                index: i as u32,
                position,
                distance: position.dot(normal),
            })
            .collect();
        entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self { normal, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect into `out` the indices of all positions within `radius` of
    /// `position`, including the position itself if it was sorted. `out` is
    /// cleared first; results are in key order.
    ///
    /// Returns how many entries fell inside the key range. The scan stops
    /// after `max_scan + 1` entries, leaving `out` incomplete; callers treat a
    /// return value above `max_scan` as a failed query.
    pub fn find_positions(
        &self,
        position: Vec3,
        radius: f32,
        max_scan: usize,
        out: &mut Vec<u32>,
    ) -> usize {
        out.clear();
        let key = position.dot(self.normal);
        let (min, max) = (key - radius, key + radius);
        let radius_sq = radius * radius;

        let start = self.entries.partition_point(|e| e.distance < min);
        let range = &self.entries[start..];
        let scanned = range
            .iter()
            .take(max_scan.saturating_add(1))
            .take_while(|e| e.distance <= max)
            .count();
        out.extend(
            range[..scanned]
                .iter()
                .filter(|e| e.position.distance_squared(position) <= radius_sq)
                .map(|e| e.index),
        );
        scanned
    }
}
