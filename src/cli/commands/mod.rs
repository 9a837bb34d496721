pub mod build_engine;
pub mod generate;
pub mod sdk_module;
pub mod update;
