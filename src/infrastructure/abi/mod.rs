//! ABI infrastructure - alloy-backed decoding, remote resolvers and local scanning

mod decoder;
mod resolver;
mod scanner;
mod sourcify;

pub use decoder::{decode_params, AlloyAbiDecoder};
pub use resolver::{
    http_client, CachedResolver, FallbackResolver, FourByteResolver, LocalResolver,
    NoSignatures, OpenChainResolver, DEFAULT_FOURBYTE_URL, DEFAULT_OPENCHAIN_URL,
};
pub use scanner::{read_abi_file, AbiScanner};
pub use sourcify::{NoAbiSource, SourcifyAbiSource, DEFAULT_SOURCIFY_URL};
