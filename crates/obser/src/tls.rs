// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the rustls ring provider (needed for reqwest even on plain HTTP).
pub fn ensure_crypto_provider() {
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
