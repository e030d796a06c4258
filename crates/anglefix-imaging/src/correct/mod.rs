// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric and colour correction: damped rotation, the post enhancer, and
// the photo fixer stages.

pub mod enhance;
pub mod photo;
pub mod rotate;
