use crate::store::keys::{self, CollectionKind};
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_normalize_levels", m002_normalize_levels),
    ]
}

/// 执行所有未应用的迁移。
///
/// - 每个迁移必须幂等：进程可能在迁移完成后、写入版本号之前退出。
/// - 版本号在每个迁移成功后立即持久化。
/// - 仅向前：set_version 拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn latest_version() -> u32 {
    migrations().len() as u32
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(keys::SCHEMA_VERSION.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("schema version has {} bytes, expected 4", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(keys::SCHEMA_VERSION.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Older builds stored words straight from the model output, sometimes
/// without a numeric `level`. Rewrite such entries with `level: 0`.
/// Blobs that do not parse are left as they are.
fn m002_normalize_levels(store: &Store) -> Result<(), StoreError> {
    for kind in CollectionKind::ALL {
        let key = kind.blob_key();
        let Some(raw) = store.content.get(key.as_bytes())? else {
            continue;
        };
        let mut items: Vec<serde_json::Value> = match serde_json::from_slice(&raw) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(collection = %kind, error = %error, "Skipping unreadable collection during migration");
                continue;
            }
        };

        let mut changed = 0usize;
        for item in items.iter_mut() {
            if let Some(obj) = item.as_object_mut() {
                let valid = obj.get("level").map(|v| v.is_u64()).unwrap_or(false);
                if !valid {
                    obj.insert("level".to_string(), serde_json::Value::from(0_u32));
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            store.write_blob(key, &items)?;
            tracing::info!(collection = %kind, changed, "Normalized item levels");
        }
    }
    Ok(())
}
