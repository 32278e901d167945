//! Generated gRPC stubs for the part-server protocol. Everything in this
//! crate is produced by `tonic-build` from `proto/partserver.proto`; it
//! carries no hand-written logic.
tonic::include_proto!("objectstore.partserver.v1");
