//! drivesync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `HistoryEntry`, `TransferAction`, `Actor`
//! - **Use cases** - `ResolveFolderUseCase`
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `IHistoryLedger`
//! - **Configuration** - YAML-backed [`config::Config`]
//!
//! # Architecture
//!
//! The domain module is pure data and validation. Ports define the trait
//! interfaces that the drive and history crates implement, and use cases
//! drive those ports.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
