pub mod ispd;
