//! dojutsu: Client library and command-line interface for the Dojutsu daemon
//!
//! The [`ipc`] module is the library surface: [`ipc::DojutsuClient`] invokes
//! named operations on the background daemon over its Unix socket. The
//! `dojutsu` binary is a thin front end over the same client.

pub mod commands;
pub mod ipc;
pub mod output;
