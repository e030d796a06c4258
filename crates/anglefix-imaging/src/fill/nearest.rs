// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uniform-grid spatial index for nearest-donor queries.

/// Points bucketed into square cells.
#[derive(Debug, Clone)]
pub struct PointIndex<T> {
    cell: u32,
    cols: u32,
    rows: u32,
    buckets: Vec<Vec<(u32, u32, T)>>,
    len: usize,
}

impl<T: Copy> PointIndex<T> {
    /// An empty index covering `width` x `height` with `cell`-sized buckets.
    pub fn new(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let cols = width.div_ceil(cell).max(1);
        let rows = height.div_ceil(cell).max(1);
        Self {
            cell,
            cols,
            rows,
            buckets: vec![Vec::new(); cols as usize * rows as usize],
            len: 0,
        }
    }

    pub fn insert(&mut self, x: u32, y: u32, value: T) {
        let cx = (x / self.cell).min(self.cols - 1);
        let cy = (y / self.cell).min(self.rows - 1);
        self.buckets[(cy * self.cols + cx) as usize].push((x, y, value));
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Closest point to `(x, y)` by Euclidean distance.
    ///
    /// Ties go to the point inserted first within the first cell searched.
    pub fn nearest(&self, x: u32, y: u32) -> Option<(u32, u32, T)> {
        if self.is_empty() {
            return None;
        }
        let qx = (x / self.cell).min(self.cols - 1) as i64;
        let qy = (y / self.cell).min(self.rows - 1) as i64;
        let max_ring = self.cols.max(self.rows) as i64;

        let mut best: Option<(u64, (u32, u32, T))> = None;
        for ring in 0..=max_ring {
            for cy in (qy - ring)..=(qy + ring) {
                for cx in (qx - ring)..=(qx + ring) {
                    let on_ring = (cx - qx).abs() == ring || (cy - qy).abs() == ring;
                    if !on_ring || cx < 0 || cy < 0 || cx >= self.cols as i64 || cy >= self.rows as i64
                    {
                        continue;
                    }
                    for &(px, py, value) in &self.buckets[(cy * self.cols as i64 + cx) as usize] {
                        let dx = px as i64 - x as i64;
                        let dy = py as i64 - y as i64;
                        let d2 = (dx * dx + dy * dy) as u64;
                        if best.is_none_or(|(b, _)| d2 < b) {
                            best = Some((d2, (px, py, value)));
                        }
                    }
                }
            }
            // Every cell on the next ring is at least `ring * cell` away.
            if let Some((d2, _)) = best {
                let reach = (ring as u64) * self.cell as u64;
                if d2 <= reach * reach {
                    break;
                }
            }
        }
        best.map(|(_, point)| point)
    }
}
