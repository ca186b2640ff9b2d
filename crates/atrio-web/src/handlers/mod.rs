//! HTTP handlers: public submission forms and admin listings.

pub mod admin;
pub mod contact;
pub mod payment;
