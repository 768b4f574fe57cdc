//! Protobuf schema of the packed transaction record.
//!
//! Written out by hand instead of generated by `prost-build`. Scalar fields
//! are proto2 `required` so zero values are still emitted; records packed by
//! earlier deployments rely on that exact byte layout. New fields must be
//! added as `optional` with fresh tags.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoTransaction {
    #[prost(bytes = "vec", required, tag = "1")]
    pub txid: Vec<u8>,
    #[prost(bytes = "vec", required, tag = "2")]
    pub hex: Vec<u8>,
    #[prost(uint64, required, tag = "3")]
    pub blocktime: u64,
    #[prost(uint32, required, tag = "4")]
    pub locktime: u32,
    #[prost(uint32, required, tag = "5")]
    pub height: u32,
    #[prost(message, repeated, tag = "6")]
    pub vin: Vec<proto_transaction::VinType>,
    #[prost(message, repeated, tag = "7")]
    pub vout: Vec<proto_transaction::VoutType>,
    #[prost(int32, required, tag = "8")]
    pub version: i32,
    #[prost(uint64, required, tag = "9")]
    pub time: u64,
}

pub mod proto_transaction {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VinType {
        #[prost(string, required, tag = "1")]
        pub coinbase: String,
        #[prost(bytes = "vec", required, tag = "2")]
        pub txid: Vec<u8>,
        #[prost(uint32, required, tag = "3")]
        pub vout: u32,
        #[prost(bytes = "vec", required, tag = "4")]
        pub script_sig_hex: Vec<u8>,
        #[prost(uint32, required, tag = "5")]
        pub sequence: u32,
        #[prost(string, repeated, tag = "6")]
        pub addresses: Vec<String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VoutType {
        /// Minimal big-endian unsigned value; empty for zero.
        #[prost(bytes = "vec", required, tag = "1")]
        pub value_sat: Vec<u8>,
        #[prost(uint32, required, tag = "2")]
        pub n: u32,
        #[prost(bytes = "vec", required, tag = "3")]
        pub script_pub_key_hex: Vec<u8>,
        #[prost(string, repeated, tag = "4")]
        pub addresses: Vec<String>,
    }
}
