//! # Ledger Contract Binding
//!
//! Typed access to the on-chain video ledger: calldata builders for its
//! functions, decoders for their return values, and the `VideoAdded` event
//! codec. The contract stores videos in a mapping, so reads of unassigned
//! ids return a zero-initialized record rather than reverting; callers
//! treat `id == 0` as absent.

use shared_evm::abi::{self, Param, Token};
use shared_evm::errors::CodecError;
use shared_evm::keccak::{event_topic, selector};
use shared_evm::logs::{Log, LogFilter};
use shared_types::entities::{Address, BlockNumber, Video, VideoId, H256, U256};

/// Signature of the total-count getter.
pub const SIG_VIDEO_COUNT: &str = "videoCount()";
/// Signature of the per-id getter generated for the videos mapping.
pub const SIG_VIDEOS: &str = "videos(uint256)";
/// Signature of the upload entry point.
pub const SIG_UPLOAD_VIDEO: &str = "uploadVideo(string,string)";
/// Signature of the contract-name getter.
pub const SIG_NAME: &str = "name()";
/// Signature of the owner getter.
pub const SIG_OWNER: &str = "owner()";
/// Signature of the append event. No argument is indexed, so every field
/// travels in the log data.
pub const SIG_VIDEO_ADDED: &str = "VideoAdded(uint256,string,string,address)";

/// Tuple layout shared by the `videos` getter return and the `VideoAdded`
/// event data.
const VIDEO_TUPLE: [Param; 4] = [Param::Uint, Param::Str, Param::Str, Param::Address];

/// A deployed instance of the video ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerContract {
    address: Address,
}

impl LedgerContract {
    /// Bind to a deployed contract address.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Address the binding points at.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Calldata for `videoCount()`.
    #[must_use]
    pub fn video_count_call(&self) -> Vec<u8> {
        abi::encode_call(selector(SIG_VIDEO_COUNT), &[])
    }

    /// Calldata for `videos(id)`.
    #[must_use]
    pub fn video_call(&self, id: VideoId) -> Vec<u8> {
        abi::encode_call(selector(SIG_VIDEOS), &[Token::Uint(U256::from(id))])
    }

    /// Calldata for `uploadVideo(hash, title)`.
    #[must_use]
    pub fn upload_video_call(&self, hash: &str, title: &str) -> Vec<u8> {
        abi::encode_call(
            selector(SIG_UPLOAD_VIDEO),
            &[Token::Str(hash.to_string()), Token::Str(title.to_string())],
        )
    }

    /// Calldata for `name()`.
    #[must_use]
    pub fn name_call(&self) -> Vec<u8> {
        abi::encode_call(selector(SIG_NAME), &[])
    }

    /// Calldata for `owner()`.
    #[must_use]
    pub fn owner_call(&self) -> Vec<u8> {
        abi::encode_call(selector(SIG_OWNER), &[])
    }

    /// Decode a `videoCount()` return value.
    pub fn decode_video_count(&self, data: &[u8]) -> Result<u64, CodecError> {
        let tokens = abi::decode(data, &[Param::Uint])?;
        match tokens.as_slice() {
            [Token::Uint(count)] => uint_to_u64(*count, "video count"),
            other => Err(CodecError::FieldCount {
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// Decode a `videos(id)` return value.
    pub fn decode_video(&self, data: &[u8]) -> Result<Video, CodecError> {
        video_from_tokens(abi::decode(data, &VIDEO_TUPLE)?)
    }

    /// Decode a `name()` return value.
    pub fn decode_name(&self, data: &[u8]) -> Result<String, CodecError> {
        let tokens = abi::decode(data, &[Param::Str])?;
        match tokens.as_slice() {
            [Token::Str(name)] => Ok(name.clone()),
            other => Err(CodecError::FieldCount {
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// Decode an `owner()` return value.
    pub fn decode_owner(&self, data: &[u8]) -> Result<Address, CodecError> {
        let tokens = abi::decode(data, &[Param::Address])?;
        match tokens.as_slice() {
            [Token::Address(owner)] => Ok(*owner),
            other => Err(CodecError::FieldCount {
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// Decode `uploadVideo` calldata back into its `(hash, title)` pair.
    pub fn decode_upload_video_call(&self, calldata: &[u8]) -> Result<(String, String), CodecError> {
        let body = abi::strip_selector(calldata, selector(SIG_UPLOAD_VIDEO))?;
        let tokens = abi::decode(body, &[Param::Str, Param::Str])?;
        match tokens.as_slice() {
            [Token::Str(hash), Token::Str(title)] => Ok((hash.clone(), title.clone())),
            other => Err(CodecError::FieldCount {
                expected: 2,
                actual: other.len(),
            }),
        }
    }

    /// Topic-0 of the `VideoAdded` event.
    #[must_use]
    pub fn video_added_topic() -> H256 {
        event_topic(SIG_VIDEO_ADDED)
    }

    /// Encode the data section of a `VideoAdded` log.
    #[must_use]
    pub fn encode_video_added_data(video: &Video) -> Vec<u8> {
        abi::encode_tokens(&[
            Token::Uint(U256::from(video.id)),
            Token::Str(video.hash.clone()),
            Token::Str(video.title.clone()),
            Token::Address(video.author),
        ])
    }

    /// Decode a `VideoAdded` log into the appended video and the block it
    /// landed in.
    pub fn decode_video_added(&self, log: &Log) -> Result<(Video, BlockNumber), CodecError> {
        if log.topics.first() != Some(&Self::video_added_topic()) {
            return Err(CodecError::TopicMismatch("VideoAdded"));
        }
        let video = video_from_tokens(abi::decode(&log.data, &VIDEO_TUPLE)?)?;
        Ok((video, log.block_number))
    }

    /// Filter selecting `VideoAdded` logs from this contract.
    #[must_use]
    pub fn video_added_filter(&self, from_block: u64, to_block: Option<u64>) -> LogFilter {
        LogFilter {
            address: Some(self.address),
            topic0: Some(Self::video_added_topic()),
            from_block,
            to_block,
        }
    }
}

fn video_from_tokens(tokens: Vec<Token>) -> Result<Video, CodecError> {
    match tokens.as_slice() {
        [Token::Uint(id), Token::Str(hash), Token::Str(title), Token::Address(author)] => {
            Ok(Video {
                id: uint_to_u64(*id, "video id")?,
                hash: hash.clone(),
                title: title.clone(),
                author: *author,
            })
        }
        other => Err(CodecError::FieldCount {
            expected: 4,
            actual: other.len(),
        }),
    }
}

fn uint_to_u64(value: U256, field: &'static str) -> Result<u64, CodecError> {
    if value > U256::from(u64::MAX) {
        return Err(CodecError::ValueOverflow(field));
    }
    Ok(value.as_u64())
}
