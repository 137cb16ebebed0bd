// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: filesystem concerns the pipeline and CLI share.

pub mod data_dir;
pub mod paths;
pub mod scratch;
