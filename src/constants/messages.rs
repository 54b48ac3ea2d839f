//! User-facing text. The bot speaks Japanese to its communities.

use crate::db::models::ChannelRole;
use crate::utils::formatting::truncate;

/// Discord rejects message content longer than this
pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const CHANNEL_NOT_FOUND: &str = "指定したチャンネルが見つかりませんでした。";
pub const PERMISSION_DENIED: &str = "メッセージを送信する権限がありません。";
pub const GENERIC_FAILURE: &str = "エラーが発生しました。しばらくしてからもう一度お試しください。";

pub const BROADCAST_SENT: &str = "メッセージをお知らせチャンネルに送信するよっ！";
pub const CONTROL_SURFACE_HEADER: &str = "ボタンを押してみんなにお知らせしよう！";

pub const MISSING_USER_PERMISSION: &str = "このコマンドを実行する権限がありません。";

pub const CLEAR_INVALID_COUNT: &str = "削除する件数は1以上で指定してください。";

pub const RELAY_DONE: &str = "全サーバーへのお知らせ送信が完了しました！";
pub const RELAY_HEADER: &str = "📢 運営からのお知らせだよっ！";

/// Notice shown when a required channel role has not been set up yet
pub fn not_configured(role: ChannelRole) -> String {
    format!(
        "{}チャンネルが設定されていません。`/{}` を実行してください。",
        role.display_name(),
        role.setup_command()
    )
}

/// Per-outcome summary used by the `summary` relay confirmation policy
pub fn relay_summary(delivered: usize, failed: usize, skipped: usize) -> String {
    format!(
        "お知らせ送信結果: 成功 {} / 失敗 {} / 未設定 {}",
        delivered, failed, skipped
    )
}

/// Wrap an admin message before it is fanned out to every notify channel
pub fn wrap_relay_body(body: &str) -> String {
    let room = MAX_MESSAGE_CHARS - RELAY_HEADER.chars().count() - 1;
    format!("{}\n{}", RELAY_HEADER, truncate(body, room))
}
