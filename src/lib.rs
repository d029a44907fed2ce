//! Chat widget controller with a payment-gated lock and a winners panel.
//!
//! The controller owns widget state and pushes every visible change through
//! a [`view::ChatView`]; outbound traffic goes through a
//! [`transport::Transport`]. Inbound frames arrive on a channel and are
//! applied by [`adapter::run`].

pub mod adapter;
pub mod api;
pub mod bot;
pub mod config;
pub mod controller;
pub mod inbound;
pub mod payment;
pub mod state;
pub mod transport;
pub mod view;
