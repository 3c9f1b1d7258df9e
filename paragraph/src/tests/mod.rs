// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_lines;
mod test_state;
mod test_wrap;

mod utils;
