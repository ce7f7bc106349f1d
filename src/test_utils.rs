//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::flake_ref::FlakeRef;
    use crate::core::hash::{Hash, HashAlgorithm};
    use crate::core::lock::{LockedInput, LockedInputs};

    /// Generate an input name
    pub fn input_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,15}"
    }

    /// Generate a 40-character commit hash
    pub fn rev() -> impl Strategy<Value = String> {
        "[0-9a-f]{40}"
    }

    /// Generate a branch or tag name
    pub fn branch() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,10}[a-z0-9]"
    }

    fn owner_repo() -> impl Strategy<Value = (String, String)> {
        ("[a-zA-Z][a-zA-Z0-9_-]{0,10}", "[a-zA-Z][a-zA-Z0-9_-]{0,10}")
    }

    /// Generate a SHA-256 hash
    pub fn sha256_hash() -> impl Strategy<Value = Hash> {
        proptest::array::uniform32(any::<u8>())
            .prop_map(|digest| Hash::new(HashAlgorithm::Sha256, digest.to_vec()).unwrap())
    }

    /// Generate a reference that pins a revision
    pub fn immutable_ref() -> impl Strategy<Value = FlakeRef> {
        prop_oneof![
            (owner_repo(), rev()).prop_map(|((owner, repo), rev)| format!(
                "github:{owner}/{repo}/{rev}"
            )),
            (owner_repo(), proptest::option::of(branch()), rev()).prop_map(
                |((owner, repo), branch, rev)| match branch {
                    Some(branch) => format!(
                        "git+https://example.org/{owner}/{repo}.git?ref={branch}&rev={rev}"
                    ),
                    None => format!("git+https://example.org/{owner}/{repo}.git?rev={rev}"),
                }
            ),
            (owner_repo(), rev())
                .prop_map(|((owner, repo), rev)| format!("path:/src/{owner}/{repo}?rev={rev}")),
            (owner_repo(), rev()).prop_map(|((id, _), rev)| format!("{id}/{rev}")),
        ]
        .prop_map(|text| text.parse::<FlakeRef>().unwrap())
    }

    /// Generate a reference that floats
    pub fn mutable_ref() -> impl Strategy<Value = FlakeRef> {
        prop_oneof![
            owner_repo().prop_map(|(owner, repo)| format!("github:{owner}/{repo}")),
            (owner_repo(), branch())
                .prop_map(|((owner, repo), branch)| format!("github:{owner}/{repo}/{branch}")),
            owner_repo().prop_map(|(owner, repo)| format!("git+ssh://git@example.org/{owner}/{repo}")),
            owner_repo().prop_map(|(id, _)| id),
        ]
        .prop_map(|text| text.parse::<FlakeRef>().unwrap())
    }

    /// Generate any reference
    pub fn any_ref() -> impl Strategy<Value = FlakeRef> {
        prop_oneof![immutable_ref(), mutable_ref()]
    }

    /// Generate a valid tree of locked inputs, up to three levels deep
    pub fn locked_inputs() -> impl Strategy<Value = LockedInputs> {
        Just(LockedInputs::new()).prop_recursive(3, 24, 3, |nested| {
            proptest::collection::vec(
                (input_name(), immutable_ref(), any_ref(), sha256_hash(), nested),
                0..4,
            )
            .prop_map(|entries| {
                entries.into_iter().fold(
                    LockedInputs::new(),
                    |inputs, (name, reference, original, hash, nested)| {
                        inputs.with_input(
                            name,
                            LockedInput::new(reference, original, hash, nested).unwrap(),
                        )
                    },
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::core::flake_ref::FlakeRef;
    use crate::core::lock::{LockFile, LockedInput, LockedInputs};
    use crate::core::store::Store;
    use crate::error::LockFileError;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_immutable_ref_generator(r in immutable_ref()) {
            prop_assert!(r.is_immutable());
            prop_assert_eq!(r.to_string().parse::<FlakeRef>().unwrap(), r);
        }

        #[test]
        fn test_mutable_ref_generator(r in mutable_ref()) {
            prop_assert!(!r.is_immutable());
            prop_assert_eq!(r.to_string().parse::<FlakeRef>().unwrap(), r);
        }

        /// Serialization is a bijection on valid trees
        #[test]
        fn prop_lock_file_text_roundtrip(inputs in locked_inputs()) {
            let lock = LockFile::new(inputs);
            let text = lock.to_json_string();
            let reparsed = LockFile::from_json_str(&text).unwrap();
            prop_assert_eq!(&reparsed, &lock);
            prop_assert_eq!(reparsed.to_json_string(), text);
            prop_assert!(reparsed.is_immutable());
        }

        /// A mutable resolved reference is rejected whatever the original says
        #[test]
        fn prop_mutable_reference_always_rejected(
            reference in mutable_ref(),
            original in any_ref(),
            hash in sha256_hash(),
        ) {
            let json = serde_json::json!({
                "url": reference.to_string(),
                "originalUrl": original.to_string(),
                "narHash": hash.to_string(),
            });
            let is_mutable_error = matches!(
                LockedInput::from_json(&json),
                Err(LockFileError::MutableLockedReference { .. })
            );
            prop_assert!(is_mutable_error);
        }

        /// Store paths ignore everything but the hash
        #[test]
        fn prop_store_path_is_function_of_hash(
            a in immutable_ref(),
            b in immutable_ref(),
            original in any_ref(),
            hash in sha256_hash(),
        ) {
            let store = Store::with_store_dir("/nix/store");
            let x = LockedInput::new(a, original.clone(), hash.clone(), LockedInputs::new()).unwrap();
            let y = LockedInput::new(b, original, hash, LockedInputs::new()).unwrap();
            prop_assert_eq!(
                x.compute_store_path(&store).unwrap(),
                y.compute_store_path(&store).unwrap()
            );
        }
    }
}
