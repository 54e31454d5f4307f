// src/scheduler.rs
//
// Dispara o resumo diário no horário configurado (hora local do servidor).

use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;

use crate::services::notification_service::NotificationService;

/// Tempo até a próxima ocorrência de `at`. Se o horário de hoje já passou
/// (ou é agora), conta para amanhã.
pub fn duration_until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

pub fn spawn_daily_dispatch(service: NotificationService, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next(Local::now().naive_local(), at);
            tracing::info!(
                proxima_em_segundos = wait.as_secs(),
                "⏰ Próximo disparo de notificações agendado"
            );
            tokio::time::sleep(wait).await;

            // O relatório já vai para o log dentro de `dispatch`
            service.dispatch().await;
        }
    })
}
