//! # Todo
//!
//! Todo アイテムのドメインモデル。
//!
//! ## ライフサイクル
//!
//! - 作成: ID と `created_at` はサーバー側で決定し、`completed` は必ず `false`
//! - 更新: 変更できるのは `title` と `completed` のみ（[`TodoUpdate`]）
//! - 削除: 物理削除（論理削除・バージョン管理なし）
//!
//! ## 識別子
//!
//! [`TodoId`] はストレージ側の識別子（UUID v7）。API 上の文字列表現との
//! 変換は HTTP ハンドラの境界でのみ行う。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use todo_domain::todo::{Todo, TodoId, TodoTitle, TodoUpdate};
//!
//! let todo = Todo::new(TodoId::new(), TodoTitle::new("buy milk")?, chrono::Utc::now());
//!
//! let update = TodoUpdate::new(TodoTitle::new("buy milk")?, true);
//! assert!(update.modifies(&todo));
//!
//! let done = todo.apply(&update);
//! assert!(done.completed());
//! assert!(!update.modifies(&done));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// Todo の一意識別子（UUID v7）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// 文字列表現から ID を復元する
    ///
    /// 前後の空白は無視する。
    pub fn parse_str(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| DomainError::InvalidId {
                entity_type: "Todo",
                reason:      e.to_string(),
            })
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

/// Todo のタイトル
///
/// 空文字列以外はそのまま保持する（空白の除去や長さの制限はしない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct TodoTitle(String);

impl TodoTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::Validation("タイトルは必須です".to_string()));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Todo エンティティ
///
/// # 不変条件
///
/// - `id` と `created_at` は作成後に変わらない
/// - `title` は空にならない（[`TodoTitle`] が保証）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:         TodoId,
    title:      TodoTitle,
    completed:  bool,
    created_at: DateTime<Utc>,
}

impl Todo {
    /// 新しい Todo を作成する（未完了状態）
    pub fn new(id: TodoId, title: TodoTitle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed: false,
            created_at: now,
        }
    }

    /// 永続化された値から Todo を復元する
    pub fn from_db(
        id: TodoId,
        title: TodoTitle,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            completed,
            created_at,
        }
    }

    /// 更新内容を適用した新しいインスタンスを返す
    ///
    /// `id` と `created_at` は引き継がれる。
    pub fn apply(&self, update: &TodoUpdate) -> Self {
        Self {
            id:         self.id.clone(),
            title:      update.title.clone(),
            completed:  update.completed,
            created_at: self.created_at,
        }
    }

    // --- ゲッター ---

    pub fn id(&self) -> &TodoId {
        &self.id
    }

    pub fn title(&self) -> &TodoTitle {
        &self.title
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Todo の更新内容
///
/// 更新で上書きされるフィールドはこの 2 つだけ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoUpdate {
    title:     TodoTitle,
    completed: bool,
}

impl TodoUpdate {
    pub fn new(title: TodoTitle, completed: bool) -> Self {
        Self { title, completed }
    }

    pub fn title(&self) -> &TodoTitle {
        &self.title
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// 適用すると保存済みの値が変わるかどうか
    ///
    /// 更新件数（modified count）の判定に使う。同じ値での上書きは変更に数えない。
    pub fn modifies(&self, current: &Todo) -> bool {
        current.title != self.title || current.completed != self.completed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn title(value: &str) -> TodoTitle {
        TodoTitle::new(value).unwrap()
    }

    // =========================================================================
    // TodoId のテスト
    // =========================================================================

    #[test]
    fn test_todo_idは文字列表現から復元できる() {
        let id = TodoId::new();

        let parsed = TodoId::parse_str(&id.to_string()).unwrap();

        assert_eq!(parsed, id);
    }

    #[test]
    fn test_todo_idのパースは前後の空白を無視する() {
        let id = TodoId::new();

        let parsed = TodoId::parse_str(&format!("  {id} ")).unwrap();

        assert_eq!(parsed, id);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case("0123456789abcdef01234567")]
    #[case("00000000-0000-0000-0000-00000000000g")]
    fn test_todo_idは不正な文字列を拒否する(#[case] input: &str) {
        let result = TodoId::parse_str(input);

        assert!(matches!(
            result,
            Err(DomainError::InvalidId {
                entity_type: "Todo",
                ..
            })
        ));
    }

    // =========================================================================
    // TodoTitle のテスト
    // =========================================================================

    #[test]
    fn test_タイトルは空文字列を拒否する() {
        assert!(matches!(
            TodoTitle::new(""),
            Err(DomainError::Validation(_))
        ));
    }

    #[rstest]
    #[case("  buy milk  ")]
    #[case("   ")]
    #[case("\t\n")]
    #[case("牛乳")]
    fn test_タイトルは空白を含めて入力のまま保持する(#[case] input: &str) {
        assert_eq!(title(input).as_str(), input);
    }

    #[test]
    fn test_タイトルに長さの上限はない() {
        let long = "a".repeat(300);

        assert_eq!(title(&long).as_str(), long);
    }

    // =========================================================================
    // Todo のテスト
    // =========================================================================

    #[test]
    fn test_newで作成したtodoは未完了である() {
        let id = TodoId::new();

        let todo = Todo::new(id.clone(), title("buy milk"), fixed_now());

        assert_eq!(todo.id(), &id);
        assert_eq!(todo.title().as_str(), "buy milk");
        assert!(!todo.completed());
        assert_eq!(todo.created_at(), fixed_now());
    }

    #[test]
    fn test_applyはタイトルと完了状態だけを置き換える() {
        let todo = Todo::new(TodoId::new(), title("buy milk"), fixed_now());

        let updated = todo.apply(&TodoUpdate::new(title("buy bread"), true));

        assert_eq!(updated.id(), todo.id());
        assert_eq!(updated.created_at(), todo.created_at());
        assert_eq!(updated.title().as_str(), "buy bread");
        assert!(updated.completed());
    }

    #[rstest]
    #[case("buy milk", false, false)]
    #[case("buy milk", true, true)]
    #[case("buy bread", false, true)]
    #[case("buy bread", true, true)]
    fn test_modifiesは値が変わる場合のみtrueを返す(
        #[case] new_title: &str,
        #[case] completed: bool,
        #[case] expected: bool,
    ) {
        let todo = Todo::new(TodoId::new(), title("buy milk"), fixed_now());

        let update = TodoUpdate::new(title(new_title), completed);

        assert_eq!(update.modifies(&todo), expected);
    }
}
