// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity and network analysis.

- `resolver`: turns axon / dendritic-field overlaps into directed edges
- `kcore`: k-core peeling over the resulting graph
*/

pub mod kcore;
pub mod resolver;

pub use kcore::{k_core, CoreDecomposition};
pub use resolver::{find_output_connections, invert_connections};
