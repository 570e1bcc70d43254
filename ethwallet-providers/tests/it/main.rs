#![allow(clippy::all)]

mod pending_transaction;
