use crate::{CrawlState, Effect, ItemResultKind, Msg};

/// Pure update function: applies a message to state and returns report effects.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionEstablished { landing_url } => {
            let line = format!("consent confirmed: {landing_url}");
            state.authenticate(landing_url);
            vec![Effect::info(line)]
        }
        Msg::ListingParsed { items } => {
            state.begin_dispatch(items);
            vec![Effect::info(format!("listing parsed, {items} items found"))]
        }
        Msg::ItemStarted { index, total, url } => {
            if state.start_item(index, total, url.clone()) {
                vec![Effect::info(format!("[{index}/{total}] processing {url}"))]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadStarted { index, file_name } => {
            let line = format!("download started: {file_name}");
            if state.mark_downloading(index, file_name) {
                vec![Effect::info(line)]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadCompleted {
            index,
            file_name,
            bytes,
        } => {
            let line = format!("download complete: {file_name} ({bytes} bytes)");
            if state.mark_written(index, file_name, bytes) {
                vec![Effect::info(line)]
            } else {
                Vec::new()
            }
        }
        Msg::ItemDone {
            index,
            result,
            detail,
        } => {
            let total = state.total();
            match state.complete_item(index, result, detail) {
                Some(row) => match result {
                    ItemResultKind::Success => {
                        vec![Effect::debug(format!("[{index}/{total}] done {}", row.url))]
                    }
                    ItemResultKind::Failed => {
                        let reason = row.detail.as_deref().unwrap_or("unknown error");
                        vec![Effect::warn(format!(
                            "[{index}/{total}] failed {}: {reason}",
                            row.url
                        ))]
                    }
                },
                None => Vec::new(),
            }
        }
        Msg::CrawlFinished => {
            state.finish();
            let summary = state.view().summary_line();
            vec![Effect::info(format!("crawl finished: {summary}"))]
        }
    };

    (state, effects)
}
