//! 通知类型注册表
//!
//! 维护 `类型标识 -> 负载结构` 的映射。每种通知类型在启动时显式注册一次，
//! 之后注册表只读，通过 `Arc` 在创建与还原路径之间共享，无需加锁。
//!
//! 类型标识按大小写不敏感比较和存储：`NewBlock`、`newblock`、`NEWBLOCK`
//! 指向同一种通知，重复注册会在构建阶段报错。

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{NotificationError, Result};
use crate::payload::{NotificationKind, NotificationPayload};
use crate::payloads::NewBlockNotification;

/// 通知类型标识
///
/// 保留注册时的原始写法用于展示，相等性与哈希基于 Unicode 小写折叠。
#[derive(Clone)]
pub struct NotificationTypeTag(String);

impl NotificationTypeTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

/// 大小写折叠后的字符序列，`Eq` 与 `Hash` 共用同一份折叠规则
fn folded(tag: &str) -> impl Iterator<Item = char> + '_ {
    tag.chars().flat_map(char::to_lowercase)
}

impl PartialEq for NotificationTypeTag {
    fn eq(&self, other: &Self) -> bool {
        folded(&self.0).eq(folded(&other.0))
    }
}

impl Eq for NotificationTypeTag {}

impl Hash for NotificationTypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in folded(&self.0) {
            c.hash(state);
        }
        // 与 str 的哈希保持同样的终止符，避免前缀碰撞
        state.write_u8(0xff);
    }
}

impl fmt::Debug for NotificationTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for NotificationTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationTypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// 将序列化字节解码为具体负载类型的函数
pub type PayloadDecoder =
    fn(&[u8]) -> std::result::Result<Box<dyn NotificationPayload>, serde_json::Error>;

fn decode_kind<P: NotificationKind>(
    bytes: &[u8],
) -> std::result::Result<Box<dyn NotificationPayload>, serde_json::Error> {
    let payload: P = serde_json::from_slice(bytes)?;
    Ok(Box::new(payload))
}

/// 单种通知类型的负载结构
#[derive(Clone)]
pub struct PayloadSchema {
    tag: NotificationTypeTag,
    decoder: PayloadDecoder,
}

impl fmt::Debug for PayloadSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSchema")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl PayloadSchema {
    pub fn tag(&self) -> &NotificationTypeTag {
        &self.tag
    }

    /// 按该类型的结构严格解码：未知字段忽略，缺失必填字段报错
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn NotificationPayload>> {
        (self.decoder)(bytes).map_err(|source| NotificationError::PayloadSchema {
            tag: self.tag.to_string(),
            source,
        })
    }
}

/// 注册表构建器
#[derive(Debug, Default)]
pub struct NotificationRegistryBuilder {
    schemas: HashMap<NotificationTypeTag, PayloadSchema>,
}

impl NotificationRegistryBuilder {
    /// 注册一种通知类型，标识与解码逻辑均由负载类型提供
    pub fn register<P: NotificationKind>(self) -> Result<Self> {
        self.register_with(P::TYPE_TAG, decode_kind::<P>)
    }

    /// 以显式的标识和解码函数注册
    pub fn register_with(
        mut self,
        tag: impl Into<NotificationTypeTag>,
        decoder: PayloadDecoder,
    ) -> Result<Self> {
        let tag = tag.into();
        if !tag.is_well_formed() {
            return Err(NotificationError::InvalidTypeTag {
                tag: tag.to_string(),
            });
        }
        if self.schemas.contains_key(&tag) {
            return Err(NotificationError::DuplicateNotificationType {
                tag: tag.to_string(),
            });
        }

        self.schemas
            .insert(tag.clone(), PayloadSchema { tag, decoder });
        Ok(self)
    }

    pub fn build(self) -> NotificationRegistry {
        NotificationRegistry {
            schemas: self.schemas,
        }
    }
}

/// 通知类型注册表（构建后只读）
#[derive(Debug)]
pub struct NotificationRegistry {
    schemas: HashMap<NotificationTypeTag, PayloadSchema>,
}

impl NotificationRegistry {
    pub fn builder() -> NotificationRegistryBuilder {
        NotificationRegistryBuilder::default()
    }

    /// 注册全部内置通知类型
    pub fn with_builtin_kinds() -> Result<Self> {
        Ok(Self::builder()
            .register::<NewBlockNotification>()?
            .build())
    }

    /// 解析类型标识，未注册时返回 `UnknownNotificationType`
    ///
    /// 空串、含空白等畸形标识同样视为未注册，不单独区分。
    pub fn resolve(&self, tag: &str) -> Result<&PayloadSchema> {
        self.schemas
            .get(&NotificationTypeTag::new(tag))
            .ok_or_else(|| NotificationError::UnknownNotificationType {
                tag: tag.to_string(),
            })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.schemas.contains_key(&NotificationTypeTag::new(tag))
    }

    /// 已注册的类型标识（按注册时的写法，字典序）
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.schemas.keys().map(NotificationTypeTag::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
