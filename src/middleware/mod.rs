/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request id / access log / body limit
 * - proxy: API Gateway の {proxy+} パスを Router 用に書き換える
 */
pub mod http;
pub mod proxy;
