use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use shredder::confirm::{AutoConfirm, FixedResponse};
use shredder::header::{self, HEADER, HEADER_LEN};
use shredder::scheduler::PassReport;
use shredder::{config, shredder::Shredder, validator::Validator, ShredError};

/// Helper to create a temp dir holding one file with known contents
fn setup_file(name: &str, len: usize) -> Result<(TempDir, PathBuf)> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join(name);
    let contents: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
    fs::write(&path, contents)?;
    Ok((tmp, path))
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

fn shredder(workers: usize) -> Shredder {
    Shredder::new(&config::Config::default()).with_workers(workers)
}

#[tokio::test]
async fn thousand_byte_file_three_passes_one_worker() -> Result<()> {
    let (_tmp, path) = setup_file("report.txt", 1000)?;
    let original = fs::read(&path)?;

    let request = Validator::validate(path_str(&path), "3").await?;
    assert_eq!(request.iterations(), 3);
    assert_eq!(request.file_len(), 1000);

    let reports = Arc::new(Mutex::new(Vec::<PassReport>::new()));
    let sink = Arc::clone(&reports);
    let report = shredder(1)
        .with_seed(1)
        .with_progress(move |r| sink.lock().unwrap().push(r.clone()))
        .shred(&request, &AutoConfirm(false))
        .await?;

    assert_eq!(report.passes, 3);
    assert_eq!(report.workers, 1);
    assert!(!report.deleted);

    let spans: Vec<_> = reports
        .lock()
        .unwrap()
        .iter()
        .map(|r| (r.offset, r.len))
        .collect();
    assert_eq!(spans, vec![(HEADER_LEN, 1000 - HEADER_LEN), (0, 1000), (0, 1000)]);

    let data = fs::read(&path)?;
    assert_eq!(data.len(), 1000);
    assert_eq!(&data[..HEADER.len()], HEADER);
    assert_ne!(&data[HEADER.len()..], &original[HEADER.len()..]);
    Ok(())
}

#[tokio::test]
async fn length_and_header_hold_for_every_pass_count() -> Result<()> {
    for n in [1u32, 2, 5, 13, 25] {
        let (_tmp, path) = setup_file("photo.JPG", 5000)?;
        let request = Validator::validate(path_str(&path), &n.to_string()).await?;

        let report = shredder(4).shred(&request, &AutoConfirm(false)).await?;
        assert_eq!(report.passes, n);
        assert_eq!(report.workers, 4);

        let data = fs::read(&path)?;
        assert_eq!(data.len(), 5000, "length changed for n={}", n);
        assert_eq!(&data[..HEADER.len()], HEADER, "header missing for n={}", n);
        assert!(header::read_marker(&path).await?);
    }
    Ok(())
}

#[tokio::test]
async fn file_smaller_than_header_keeps_its_length() -> Result<()> {
    let (_tmp, path) = setup_file("tiny.csv", 40)?;
    let request = Validator::validate(path_str(&path), "2").await?;

    shredder(2).shred(&request, &AutoConfirm(false)).await?;

    let data = fs::read(&path)?;
    assert_eq!(data, &HEADER[..40]);
    Ok(())
}

#[tokio::test]
async fn large_file_spans_multiple_chunks() -> Result<()> {
    let len = 3 * 1024 * 1024 + 17;
    let (_tmp, path) = setup_file("movie.mp4", len)?;
    let request = Validator::validate(path_str(&path), "2").await?;

    shredder(2).shred(&request, &AutoConfirm(false)).await?;

    let data = fs::read(&path)?;
    assert_eq!(data.len(), len);
    assert_eq!(&data[..HEADER.len()], HEADER);
    // The alphabet pattern should not survive anywhere near the tail.
    let tail = &data[len - 4096..];
    assert!(tail.iter().filter(|b| b.is_ascii_lowercase()).count() < 1024);
    Ok(())
}

#[tokio::test]
async fn deletion_follows_confirmation() -> Result<()> {
    for (answer, expect_deleted) in [
        ("Y", true),
        ("y\n", true),
        ("N", false),
        ("", false),
        ("yes", false),
    ] {
        let (_tmp, path) = setup_file("notes.txt", 600)?;
        let request = Validator::validate(path_str(&path), "1").await?;

        let report = shredder(1)
            .shred(&request, &FixedResponse::new(answer))
            .await?;

        assert_eq!(report.deleted, expect_deleted, "answer {:?}", answer);
        assert_eq!(path.exists(), !expect_deleted, "answer {:?}", answer);
        if !expect_deleted {
            assert!(header::read_marker(&path).await?);
        }
    }
    Ok(())
}

#[tokio::test]
async fn rejects_bad_iteration_counts() -> Result<()> {
    let (_tmp, path) = setup_file("notes.txt", 100)?;
    for bad in ["0", "26", "abc"] {
        let err = Validator::validate(path_str(&path), bad).await.unwrap_err();
        assert!(matches!(err, ShredError::InvalidIterations), "{bad}: {err}");
    }
    Ok(())
}

#[tokio::test]
async fn rejects_missing_file() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("ghost.txt");
    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::FileNotFound));

    let err = Validator::validate(path_str(tmp.path()), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::FileNotFound));
    Ok(())
}

#[tokio::test]
async fn rejects_unlisted_extension() -> Result<()> {
    let (_tmp, path) = setup_file("archive.zip", 100)?;
    let before = fs::read(&path)?;

    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidExtension));
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn rejects_empty_and_oversized_files() -> Result<()> {
    let (_tmp, empty) = setup_file("empty.txt", 0)?;
    let err = Validator::validate(path_str(&empty), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidFileSize));
    assert_eq!(fs::metadata(&empty)?.len(), 0);

    let (_tmp2, big) = setup_file("big.txt", 0)?;
    fs::OpenOptions::new()
        .write(true)
        .open(&big)?
        .set_len(100_000_001)?;
    let err = Validator::validate(path_str(&big), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidFileSize));
    Ok(())
}

#[tokio::test]
async fn rejects_read_only_file() -> Result<()> {
    let (_tmp, path) = setup_file("locked.docx", 300)?;
    let before = fs::read(&path)?;

    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_readonly(true);
    fs::set_permissions(&path, perms)?;

    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::PermissionDenied));
    assert_eq!(fs::read(&path)?, before);

    // Let TempDir clean up on every platform.
    let mut perms = fs::metadata(&path)?.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(&path, perms)?;
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn rejects_reserved_character_in_name() -> Result<()> {
    let (_tmp, path) = setup_file("what?.txt", 300)?;
    let before = fs::read(&path)?;

    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidPath));
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn rejects_reserved_character_in_directory_name() -> Result<()> {
    let tmp = TempDir::new()?;
    let dir = tmp.path().join("wh*at?");
    fs::create_dir(&dir)?;
    let path = dir.join("notes.txt");
    fs::write(&path, vec![b'n'; 300])?;
    let before = fs::read(&path)?;

    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidPath));
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn checks_run_in_order() -> Result<()> {
    // Bad iterations win over a missing file.
    let err = Validator::validate("/definitely/not/here.zip", "0")
        .await
        .unwrap_err();
    assert!(matches!(err, ShredError::InvalidIterations));

    // Bad extension wins over a bad size.
    let (_tmp, path) = setup_file("empty.zip", 0)?;
    let err = Validator::validate(path_str(&path), "3").await.unwrap_err();
    assert!(matches!(err, ShredError::InvalidExtension));
    Ok(())
}

#[tokio::test]
async fn overwrite_without_deletion_step() -> Result<()> {
    let (_tmp, path) = setup_file("slides.pptx", 2048)?;
    let request = Validator::validate(path_str(&path), "4").await?;

    let shredder = shredder(3);
    assert_eq!(shredder.workers(), 3);
    let passes = shredder.overwrite(&request).await?;
    assert_eq!(passes, 4);
    assert!(path.exists());
    assert_eq!(fs::metadata(&path)?.len(), 2048);
    Ok(())
}

#[tokio::test]
async fn vanished_file_is_an_io_failure() -> Result<()> {
    let (_tmp, path) = setup_file("gone.txt", 500)?;
    let request = Validator::validate(path_str(&path), "2").await?;
    fs::remove_file(&path)?;

    let err = shredder(1).overwrite(&request).await.unwrap_err();
    assert!(matches!(err, ShredError::Io(_)));
    assert!(!err.is_validation());
    assert!(!path.exists());
    Ok(())
}
