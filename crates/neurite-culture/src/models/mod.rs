// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Data models for a culture.

- `Cell`: one neuron, with its soma, dendritic field, axon and connections
*/

pub mod cell;

pub use cell::Cell;
