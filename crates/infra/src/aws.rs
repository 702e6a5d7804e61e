//! # AWS SDK 設定
//!
//! SES / CloudWatch クライアントが共有する SDK 設定を読み込む。
//!
//! 認証情報とリージョンは SDK 標準のプロバイダチェーン
//! （環境変数、プロファイル、IAM ロール）から解決する。

use aws_config::{BehaviorVersion, SdkConfig};

/// SDK 共通設定を読み込む
///
/// # 引数
///
/// * `region` - 明示するリージョン（`None` の場合はプロバイダチェーンに任せる）
pub async fn load_sdk_config(region: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

/// SES v2 クライアントを作成する
pub fn ses_client(config: &SdkConfig) -> aws_sdk_sesv2::Client {
    aws_sdk_sesv2::Client::new(config)
}

/// CloudWatch クライアントを作成する
pub fn cloudwatch_client(config: &SdkConfig) -> aws_sdk_cloudwatch::Client {
    aws_sdk_cloudwatch::Client::new(config)
}
