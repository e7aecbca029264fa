use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::Member;

/// 名簿の共有ストア
///
/// 更新側は新しい名簿を別に組み立ててから `publish` で参照ごと差し替える。
/// ロックを保持するのはArcの複製・差し替えの間だけで、
/// 読み取り側がネットワークI/Oを待つことはない。
#[derive(Debug, Clone)]
pub struct RosterStore {
    members: Arc<RwLock<Arc<Vec<Member>>>>,
}

impl RosterStore {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members: Arc::new(RwLock::new(Arc::new(members))),
        }
    }

    /// 現在の名簿スナップショットを取得
    pub async fn snapshot(&self) -> Arc<Vec<Member>> {
        Arc::clone(&*self.members.read().await)
    }

    /// 組み立て済みの名簿を公開
    pub async fn publish(&self, members: Vec<Member>) {
        let next = Arc::new(members);
        *self.members.write().await = next;
    }
}
