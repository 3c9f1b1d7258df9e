// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod asserts;
mod env;

pub(crate) use asserts::{assert_close, assert_rect};
pub(crate) use env::{ColorBrush, FakeFace, TestEnv};
