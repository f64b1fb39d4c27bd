// SPDX-License-Identifier: MIT
pub mod clean;
pub mod prepare;
pub mod verify;
