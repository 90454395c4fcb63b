use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Result;
use people_reid::dataset::*;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), b"")?;
    Ok(())
}

/// `set0 .. set9`, every set holding `per_set` images `0000.jpg ..`.
fn negative_people(per_set: usize) -> Result<TempDir> {
    let root = tempfile::tempdir()?;
    for set in 0..10 {
        for label in 0..per_set {
            touch(&root.path().join(format!("set{}", set)), &format!("{:04}.jpg", label))?;
        }
    }
    Ok(root)
}

fn negative_config(root: &TempDir, n_images: usize, n_test_dir: usize) -> NegativePeopleConfig {
    NegativePeopleConfig {
        base_path: root.path().to_path_buf(),
        ..NegativePeopleConfig::new(n_images, n_test_dir)
    }
}

#[test]
fn negative_people_one_image_per_folder() -> Result<()> {
    let root = negative_people(4)?;
    let mut ds = NegativePeopleDataset::with_seed(negative_config(&root, 9, 9), 7)?;

    let samples = ds.labels_and_paths()?;
    assert_eq!(samples.len(), 9);
    assert!(!ds.image_count().is_clamped());

    for (set, sample) in samples.iter().enumerate() {
        assert_eq!(sample.label, 0);
        assert_eq!(sample.path, root.path().join(format!("set{}", set)).join("0000.jpg"));
    }

    Ok(())
}

#[test]
fn negative_people_clamps_to_capacity() -> Result<()> {
    let root = negative_people(3)?;
    let config = NegativePeopleConfig {
        images_per_folder: 3,
        ..negative_config(&root, 1000, 9)
    };
    let mut ds = NegativePeopleDataset::with_seed(config, 1)?;

    assert_eq!(ds.image_count(), ImageCount { requested: 1000, effective: 27 });
    assert!(ds.image_count().is_clamped());
    assert_eq!(ds.labels_and_paths()?.len(), 27);

    Ok(())
}

#[test]
fn negative_people_explicit_query() -> Result<()> {
    let root = negative_people(4)?;
    let mut ds = NegativePeopleDataset::with_seed(negative_config(&root, 18, 9), 3)?;

    let query = ds.query(Some(2))?;
    assert_eq!(query.label, 2);
    assert_eq!(query.path, Some(root.path().join("set9").join("0002.jpg")));

    let missing = ds.query(Some(77))?;
    assert_eq!(missing.label, 77);
    assert_eq!(missing.path, None);

    Ok(())
}

#[test]
fn negative_people_random_query_comes_from_the_test_folder() -> Result<()> {
    let root = negative_people(4)?;
    let mut ds = NegativePeopleDataset::with_seed(negative_config(&root, 18, 9), 11)?;

    for _ in 0..20 {
        let query = ds.query(None)?;
        // 2 images per set, so the index is in 0..=2
        assert!(query.index <= 2);

        let path = query.path.expect("set9 holds 4 images");
        assert!(path.starts_with(root.path().join("set9")));
        assert_eq!(path.file_name().unwrap(), format!("{:04}.jpg", query.label).as_str());
    }

    Ok(())
}

#[test]
fn negative_people_missing_layout_is_empty() -> Result<()> {
    let root = tempfile::tempdir()?;
    let mut ds = NegativePeopleDataset::new(negative_config(&root, 9, 9))?;

    assert!(ds.labels_and_paths()?.is_empty());
    assert_eq!(ds.query(None)?.path, None);

    Ok(())
}

fn street_people() -> Result<TempDir> {
    let root = tempfile::tempdir()?;
    for i in 0..60 {
        touch(&root.path().join("cam_a"), &format!("{:03}_a.bmp", i))?;
        touch(&root.path().join("cam_b"), &format!("{:03}_b.bmp", i))?;
    }
    Ok(root)
}

#[test]
fn street_people_labels_follow_order() -> Result<()> {
    let root = street_people()?;
    let mut ds = StreetPeopleDataset::with_seed(
        StreetPeopleConfig { base_path: root.path().to_path_buf(), ..StreetPeopleConfig::new(5) },
        5,
    );

    let samples = ds.labels_and_paths()?;
    assert_eq!(samples.len(), 5);
    for (i, s) in samples.iter().enumerate() {
        assert_eq!(s.label, i as i32);
        assert_eq!(s.path, root.path().join("cam_a").join(format!("{:03}_a.bmp", i)));
    }

    let query = ds.query(Some(3))?;
    assert_eq!(query.label, 3);
    assert_eq!(query.path, Some(root.path().join("cam_b").join("003_b.bmp")));

    Ok(())
}

#[test]
fn street_people_clamps_and_reports() -> Result<()> {
    let root = street_people()?;
    let mut ds = StreetPeopleDataset::new(
        StreetPeopleConfig { base_path: root.path().to_path_buf(), ..StreetPeopleConfig::new(500) },
    );

    assert!(ds.image_count().is_clamped());
    assert_eq!(ds.labels_and_paths()?.len(), 50);

    let query = ds.query(None)?;
    assert!(query.index <= 50);
    assert!(query.path.is_some());

    assert_eq!(ds.query(Some(1000))?.path, None);

    Ok(())
}

fn m100() -> Result<TempDir> {
    let root = tempfile::tempdir()?;
    for i in 0..80 {
        touch(root.path(), &format!("runner_{:02}.png", i))?;
    }
    Ok(root)
}

fn m100_config(root: &TempDir, n_images: usize) -> M100Config {
    M100Config { base_path: root.path().to_path_buf(), ..M100Config::new(n_images) }
}

#[test]
fn m100_holds_back_one_query() -> Result<()> {
    let root = m100()?;

    for seed in 0..10 {
        let mut ds = M100Dataset::with_seed(m100_config(&root, 5), seed)?;
        let samples = ds.labels_and_paths()?;
        assert_eq!(samples.len(), 5);

        let held_back = ds.pending_query().expect("query index is held back");
        let query = ds.query(None)?;
        assert_eq!(query.index, held_back);
        assert_eq!(query.label, (held_back / 10) as i32);

        let query_path = query.path.expect("every index below 80 exists");
        let paths: HashSet<_> = samples.iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths.len(), 5);
        assert!(!paths.contains(&query_path));

        for s in &samples {
            let name = s.path.file_stem().unwrap().to_str().unwrap();
            let index: i32 = name.trim_start_matches("runner_").parse()?;
            assert_eq!(s.label, index / 10);
        }
    }

    Ok(())
}

#[test]
fn m100_clamps_to_all_but_one() -> Result<()> {
    let root = m100()?;
    let mut ds = M100Dataset::with_seed(m100_config(&root, 200), 2)?;

    assert_eq!(ds.image_count().effective, 79);
    let samples = ds.labels_and_paths()?;
    assert_eq!(samples.len(), 79);

    let query = ds.query(None)?;
    assert!(samples.iter().all(|s| Some(&s.path) != query.path.as_ref()));

    Ok(())
}

#[test]
fn m100_explicit_query_uses_identity_label() -> Result<()> {
    let root = m100()?;
    let mut ds = M100Dataset::with_seed(m100_config(&root, 5), 0)?;

    let query = ds.query(Some(19))?;
    assert_eq!(query.index, 19);
    assert_eq!(query.label, 1);
    assert_eq!(query.path, Some(root.path().join("runner_19.png")));

    assert_eq!(ds.query(Some(80))?.path, None);

    Ok(())
}

#[test]
fn m100_short_folder_degrades() -> Result<()> {
    let root = tempfile::tempdir()?;
    for i in 0..10 {
        touch(root.path(), &format!("runner_{:02}.png", i))?;
    }

    let mut ds = M100Dataset::with_seed(m100_config(&root, 79), 4)?;
    let samples = ds.labels_and_paths()?;

    // only the sampled indices that exist on disk survive
    assert!(samples.len() <= 10);
    assert!(samples.iter().all(|s| s.label == 0));

    Ok(())
}
