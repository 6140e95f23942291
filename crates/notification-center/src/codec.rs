//! 通知负载编解码
//!
//! 负载序列化后经过压缩再落库。`PayloadCodec` 只约定
//! `decompress(compress(x)) == x`，不绑定具体算法：
//!
//! - **BrotliCodec**：默认实现，压缩率高，适合大量小 JSON 负载
//! - **IdentityCodec**：透传模式，开发环境排查数据时使用

use std::io::{self, Read};
use std::sync::Arc;

use brotli::enc::BrotliEncoderParams;
use notify_shared::config::CodecConfig;
use thiserror::Error;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("负载压缩失败: {0}")]
    Compress(#[source] io::Error),

    #[error("负载解压失败: {0}")]
    Decompress(#[source] io::Error),

    #[error("解压后的负载超过上限 {limit} 字节")]
    TooLarge { limit: usize },

    #[error("无效的编解码配置: {0}")]
    InvalidConfig(String),
}

/// 负载字节变换
#[cfg_attr(test, mockall::automock)]
pub trait PayloadCodec: Send + Sync {
    /// 将序列化后的负载压缩为 blob
    fn compress(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// 将 blob 还原为序列化后的负载
    fn decompress(&self, blob: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// 算法名称，用于日志
    fn name(&self) -> &'static str;
}

const BROTLI_QUALITY_MAX: u32 = 11;
const BROTLI_WINDOW_MIN: u32 = 10;
const BROTLI_WINDOW_MAX: u32 = 24;
const DECOMPRESS_BUFFER_SIZE: usize = 4096;

/// Brotli 编解码器
#[derive(Debug, Clone)]
pub struct BrotliCodec {
    quality: u32,
    window_bits: u32,
    max_blob_bytes: usize,
}

impl BrotliCodec {
    pub fn new(quality: u32, window_bits: u32, max_blob_bytes: usize) -> Result<Self, CodecError> {
        if quality > BROTLI_QUALITY_MAX {
            return Err(CodecError::InvalidConfig(format!(
                "quality 取值范围 0..={BROTLI_QUALITY_MAX}, 实际 {quality}"
            )));
        }
        if !(BROTLI_WINDOW_MIN..=BROTLI_WINDOW_MAX).contains(&window_bits) {
            return Err(CodecError::InvalidConfig(format!(
                "window_bits 取值范围 {BROTLI_WINDOW_MIN}..={BROTLI_WINDOW_MAX}, 实际 {window_bits}"
            )));
        }
        Ok(Self {
            quality,
            window_bits,
            max_blob_bytes,
        })
    }
}

impl Default for BrotliCodec {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self {
            quality: config.quality,
            window_bits: config.window_bits,
            max_blob_bytes: config.max_blob_bytes,
        }
    }
}

impl PayloadCodec for BrotliCodec {
    fn compress(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        let params = BrotliEncoderParams {
            quality: self.quality as i32,
            lgwin: self.window_bits as i32,
            ..Default::default()
        };

        let mut blob = Vec::with_capacity(payload.len() / 2 + 16);
        brotli::BrotliCompress(&mut &payload[..], &mut blob, &params)
            .map_err(CodecError::Compress)?;
        Ok(blob)
    }

    fn decompress(&self, blob: &[u8]) -> Result<Vec<u8>, CodecError> {
        // 最多多读 1 字节用于判断是否越界，超限的流不会被完整展开
        let limit = self.max_blob_bytes;
        let mut payload = Vec::with_capacity(blob.len().saturating_mul(3).min(limit));
        // 截断的流与非法字节都以 InvalidData 结束
        brotli::Decompressor::new(blob, DECOMPRESS_BUFFER_SIZE)
            .take((limit as u64).saturating_add(1))
            .read_to_end(&mut payload)
            .map_err(CodecError::Decompress)?;

        if payload.len() > limit {
            return Err(CodecError::TooLarge { limit });
        }
        Ok(payload)
    }

    fn name(&self) -> &'static str {
        "brotli"
    }
}

/// 透传编解码器，blob 即序列化后的负载原文
#[derive(Debug, Clone, Default)]
pub struct IdentityCodec;

impl PayloadCodec for IdentityCodec {
    fn compress(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(payload.to_vec())
    }

    fn decompress(&self, blob: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(blob.to_vec())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// 按配置构建编解码器
pub fn codec_from_config(config: &CodecConfig) -> Result<Arc<dyn PayloadCodec>, CodecError> {
    match config.algorithm.to_ascii_lowercase().as_str() {
        "brotli" => Ok(Arc::new(BrotliCodec::new(
            config.quality,
            config.window_bits,
            config.max_blob_bytes,
        )?)),
        "identity" => Ok(Arc::new(IdentityCodec)),
        other => Err(CodecError::InvalidConfig(format!("未知的压缩算法: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    #[test]
    fn test_brotli_round_trip() {
        let codec = BrotliCodec::default();
        let samples: [&[u8]; 4] = [
            b"",
            b"{\"cryptoCode\":\"BTC\",\"height\":700000}",
            &[0u8, 255, 1, 254, 2, 253],
            "区块通知".as_bytes(),
        ];

        for sample in samples {
            let blob = codec.compress(sample).unwrap();
            assert_eq!(codec.decompress(&blob).unwrap(), sample);
        }
    }

    #[test]
    fn test_brotli_compresses_repetitive_payload() {
        let codec = BrotliCodec::default();
        let payload = "{\"cryptoCode\":\"BTC\"}".repeat(200);

        let blob = codec.compress(payload.as_bytes()).unwrap();
        assert!(blob.len() < payload.len());
    }

    #[test]
    fn test_brotli_truncated_blob_fails() {
        let codec = BrotliCodec::default();
        let payload = "{\"cryptoCode\":\"BTC\",\"height\":700000}".repeat(20);
        let blob = codec.compress(payload.as_bytes()).unwrap();

        let truncated = &blob[..blob.len() / 2];
        assert!(matches!(
            codec.decompress(truncated),
            Err(CodecError::Decompress(_))
        ));
    }

    #[test]
    fn test_brotli_empty_blob_fails() {
        let codec = BrotliCodec::default();
        assert!(codec.decompress(&[]).is_err());
    }

    #[test]
    fn test_brotli_rejects_oversized_payload() {
        let codec = BrotliCodec::new(5, 22, 16).unwrap();
        let blob = codec.compress(&[b'a'; 64]).unwrap();

        match codec.decompress(&blob) {
            Err(CodecError::TooLarge { limit }) => assert_eq!(limit, 16),
            other => panic!("expected TooLarge, got {other:?}"),
        }

        // 恰好等于上限时不报错
        let exact = codec.compress(&[b'a'; 16]).unwrap();
        assert_eq!(codec.decompress(&exact).unwrap().len(), 16);
    }

    #[test]
    fn test_brotli_highly_compressible_blob_stops_at_limit() {
        // 16 MiB 的零压缩后只有几百字节，解压时应在上限处截断而不是整段展开
        let payload = vec![0u8; 16 * 1024 * 1024];
        let blob = BrotliCodec::default().compress(&payload).unwrap();
        assert!(blob.len() < 4096);

        let codec = BrotliCodec::new(5, 22, 1024).unwrap();
        assert!(matches!(
            codec.decompress(&blob),
            Err(CodecError::TooLarge { limit: 1024 })
        ));
    }

    #[test]
    fn test_brotli_random_round_trip() {
        let codec = BrotliCodec::default();
        for _ in 0..50 {
            let len = (0..4096usize).fake::<usize>();
            let sample: Vec<u8> = (0..len).map(|_| Faker.fake::<u8>()).collect();

            let blob = codec.compress(&sample).unwrap();
            assert_eq!(codec.decompress(&blob).unwrap(), sample);
        }
    }

    #[test]
    fn test_brotli_invalid_parameters() {
        assert!(matches!(
            BrotliCodec::new(12, 22, 1024),
            Err(CodecError::InvalidConfig(_))
        ));
        assert!(matches!(
            BrotliCodec::new(5, 9, 1024),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_identity_round_trip() {
        let codec = IdentityCodec;
        let blob = codec.compress(b"plain").unwrap();
        assert_eq!(blob, b"plain");
        assert_eq!(codec.decompress(&blob).unwrap(), b"plain");
        assert_eq!(codec.decompress(&[]).unwrap(), b"");
    }

    #[test]
    fn test_codec_from_config() {
        let brotli = codec_from_config(&CodecConfig::default()).unwrap();
        assert_eq!(brotli.name(), "brotli");

        let identity = codec_from_config(&CodecConfig {
            algorithm: "Identity".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(identity.name(), "identity");

        let unknown = codec_from_config(&CodecConfig {
            algorithm: "gzip".to_string(),
            ..Default::default()
        });
        assert!(matches!(unknown, Err(CodecError::InvalidConfig(_))));

        let alias = codec_from_config(&CodecConfig {
            algorithm: "none".to_string(),
            ..Default::default()
        });
        assert!(matches!(alias, Err(CodecError::InvalidConfig(_))));
    }
}
