//! # Preonic Types
//!
//! Fundamental type definitions shared by the keymap firmware and its build tooling.
//!
//! - [`action`] - Key actions: plain keys, layer operations, light, audio and dynamic macro keys
//! - [`keycode`] - HID keycodes and consumer (media) keys
//! - [`modifier`] - Modifier combinations and the HID modifier byte

#![no_std]

pub mod action;
pub mod keycode;
pub mod modifier;
