// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lipikar-app: the pipeline driver and the services behind the `lipikar` CLI.

pub mod pipeline;
pub mod services;

pub use pipeline::{PageProgress, Pipeline, RunReport};
