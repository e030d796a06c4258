// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: the owned pixel buffer plus decode, encode, and resize.

pub mod processor;
pub mod raster;

pub use raster::RasterImage;
