//! End-to-end scenarios (§8 S1-S6), exercising the writer, reader and
//! decode pipeline together the way a real caller would rather than one
//! component in isolation.

use std::io::Cursor;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::backend::{PositionedReader, SeekLockedStore};
use crate::io::primitives::Endian;
use crate::pipeline::{DecodeContext, Middleware, PipelineNode};
use crate::photometric::{BlackIsZero, WhiteIsZero};
use crate::pixelbuffer::PixelBuffer;
use crate::tiff::cursor::WriterCursor;
use crate::tiff::errors::TiffError;
use crate::tiff::field_type::FieldType;
use crate::tiff::ifd_reader::{read_chain, read_directory, read_typed, IfdReaderOptions, OrderPolicy};
use crate::tiff::ifd_writer::IfdWriter;
use crate::tiff::mode::FileMode;
use crate::values::ValueCollection;

fn store_cursor(mode: FileMode) -> WriterCursor<SeekLockedStore<Cursor<Vec<u8>>>> {
    WriterCursor::new(SeekLockedStore::new(Cursor::new(Vec::new())), mode, Endian::Little)
}

/// S1: write a Classic TIFF with one IFD and a 4-byte BlackIsZero strip,
/// then read the tags back and decode the strip through the pipeline.
#[tokio::test]
async fn s1_classic_round_trip_decodes_black_is_zero() {
    let cursor = store_cursor(FileMode::Classic);
    let strip = [0x00u8, 0x55, 0xAA, 0xFF];
    let strip_offset = cursor.write_aligned_bytes(&strip).unwrap();

    let mut ifd = IfdWriter::new(&cursor);
    ifd.add_entry::<u32>(256, &ValueCollection::from(2u32)); // ImageWidth
    ifd.add_entry::<u32>(257, &ValueCollection::from(2u32)); // ImageLength
    ifd.add_entry::<u16>(258, &ValueCollection::from(8u16)); // BitsPerSample
    ifd.add_entry::<u16>(262, &ValueCollection::from(1u16)); // PhotometricInterpretation = BlackIsZero
    ifd.add_entry::<u16>(277, &ValueCollection::from(1u16)); // SamplesPerPixel
    ifd.add_entry::<u32>(278, &ValueCollection::from(2u32)); // RowsPerStrip
    ifd.add_entry::<u32>(273, &ValueCollection::from(strip_offset as u32)); // StripOffsets
    ifd.add_entry::<u32>(279, &ValueCollection::from(4u32)); // StripByteCounts
    let ifd_offset = ifd.commit(None).unwrap();
    cursor.flush_header().unwrap();

    let options = IfdReaderOptions::default();
    let directory =
        read_directory(cursor.backend(), Endian::Little, FileMode::Classic, ifd_offset, &options)
            .unwrap();

    let width: ValueCollection<u32> =
        read_typed(cursor.backend(), Endian::Little, FileMode::Classic, &directory, 256).unwrap();
    let height: ValueCollection<u32> =
        read_typed(cursor.backend(), Endian::Little, FileMode::Classic, &directory, 257).unwrap();
    assert_eq!(width.first_or_default(), Some(&2));
    assert_eq!(height.first_or_default(), Some(&2));

    let photometric: ValueCollection<u16> =
        read_typed(cursor.backend(), Endian::Little, FileMode::Classic, &directory, 262).unwrap();
    assert_eq!(photometric.first_or_default(), Some(&1));

    let offsets: ValueCollection<u32> =
        read_typed(cursor.backend(), Endian::Little, FileMode::Classic, &directory, 273).unwrap();
    let read_offset = *offsets.first_or_default().unwrap() as u64;

    let mut raw = vec![0u8; 4];
    crate::io::backend::checked_result(cursor.backend().read_exact_at(read_offset, &mut raw)).unwrap();
    assert_eq!(raw, strip);

    let buffer = Arc::new(PixelBuffer::new(2, 2, 1));
    let mut context = DecodeContext::new(buffer, CancellationToken::new());
    context.uncompressed_data = raw;
    context.image_width = 2;
    context.image_height = 2;

    let interp = BlackIsZero::new(8);
    interp.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
    assert_eq!(context.pixel_buffer.snapshot(), vec![0x00, 0x55, 0xAA, 0xFF]);
}

/// S2: the same strip decoded as WhiteIsZero8 comes out bitwise-inverted.
#[tokio::test]
async fn s2_white_is_zero_inverts_the_strip() {
    let buffer = Arc::new(PixelBuffer::new(2, 2, 1));
    let mut context = DecodeContext::new(buffer, CancellationToken::new());
    context.uncompressed_data = vec![0x00, 0x55, 0xAA, 0xFF];
    context.image_width = 2;
    context.image_height = 2;

    let interp = WhiteIsZero::new(8);
    interp.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
    assert_eq!(context.pixel_buffer.snapshot(), vec![0xFF, 0xAA, 0x55, 0x00]);
}

/// S3: forcing the stream past the 32-bit offset range in Classic mode
/// fails `flush_header` without writing a header; the same build succeeds
/// in Big mode and the chain still reads back.
#[test]
fn s3_big_tiff_promotion() {
    let classic = store_cursor(FileMode::Classic);
    classic.seek(u32::MAX as u64).unwrap();
    classic.write_bytes(&[0u8; 8]).unwrap();
    let mut ifd = IfdWriter::new(&classic);
    ifd.add_entry::<u32>(256, &ValueCollection::from(1u32));
    ifd.commit(None).unwrap();
    let err = classic.flush_header().unwrap_err();
    assert!(matches!(err, TiffError::BigTiffRequired));

    let big = WriterCursor::new(SeekLockedStore::new(Cursor::new(Vec::new())), FileMode::Big, Endian::Little);
    big.seek(u32::MAX as u64).unwrap();
    big.write_bytes(&[0u8; 8]).unwrap();
    let mut ifd = IfdWriter::new(&big);
    ifd.add_entry::<u32>(256, &ValueCollection::from(1u32));
    let ifd_offset = ifd.commit(None).unwrap();
    big.flush_header().unwrap();

    let options = IfdReaderOptions::default();
    let chain = read_chain(big.backend(), Endian::Little, FileMode::Big, ifd_offset, &options).unwrap();
    assert_eq!(chain.len(), 1);
    let width: ValueCollection<u32> =
        read_typed(big.backend(), Endian::Little, FileMode::Big, &chain[0], 256).unwrap();
    assert_eq!(width.first_or_default(), Some(&1));
}

/// S4: a two-string ASCII tag lands on disk as the exact byte sequence
/// the format requires, NUL-terminated per string, count = total bytes.
#[test]
fn s4_ascii_multi_string_exact_bytes() {
    let cursor = store_cursor(FileMode::Classic);
    let mut ifd = IfdWriter::new(&cursor);
    let strings = ValueCollection::from(vec!["left".to_string(), "right".to_string()]);
    ifd.add_ascii(270, &strings);
    let offset = ifd.commit(None).unwrap();
    cursor.flush_header().unwrap();

    let options = IfdReaderOptions::default();
    let directory =
        read_directory(cursor.backend(), Endian::Little, FileMode::Classic, offset, &options).unwrap();
    let entry = directory.find(270).unwrap();
    assert_eq!(entry.field_type, FieldType::Ascii);
    assert_eq!(entry.count, 11);

    let recovered =
        crate::tiff::ifd_reader::read_ascii(cursor.backend(), Endian::Little, FileMode::Classic, &directory, 270)
            .unwrap();
    assert_eq!(
        recovered.as_contiguous_slice(),
        &["left".to_string(), "right".to_string()]
    );
}

/// S5: three chained IFDs enumerate in write order and terminate.
#[test]
fn s5_three_ifd_chain_enumerates_in_order() {
    let cursor = store_cursor(FileMode::Classic);
    let mut first = IfdWriter::new(&cursor);
    first.add_entry::<u32>(256, &ValueCollection::from(1u32));
    let first_offset = first.commit(None).unwrap();

    let mut second = IfdWriter::new(&cursor);
    second.add_entry::<u32>(256, &ValueCollection::from(2u32));
    let second_offset = second.commit(Some(first_offset)).unwrap();

    let mut third = IfdWriter::new(&cursor);
    third.add_entry::<u32>(256, &ValueCollection::from(3u32));
    third.commit(Some(second_offset)).unwrap();
    cursor.flush_header().unwrap();

    let options = IfdReaderOptions::default();
    let chain =
        read_chain(cursor.backend(), Endian::Little, FileMode::Classic, first_offset, &options).unwrap();
    assert_eq!(chain.len(), 3);
    assert!(chain[2].next_ifd_offset.is_none());

    for (i, directory) in chain.iter().enumerate() {
        let value: ValueCollection<u32> =
            read_typed(cursor.backend(), Endian::Little, FileMode::Classic, directory, 256).unwrap();
        assert_eq!(value.first_or_default(), Some(&(i as u32 + 1)));
    }
}

/// S6: a hand-built out-of-order directory is tolerated and re-sorted by
/// a lenient reader, but rejected by a strict one.
#[test]
fn s6_non_monotone_order_recovery() {
    use crate::tiff::cursor::{build_raw_entry, InlineOrOffset};
    use crate::tiff::entry::encode_raw_entry;

    let cursor = store_cursor(FileMode::Classic);
    let offset = cursor.position();
    cursor.write_bytes(&2u16.to_le_bytes()).unwrap();
    let descending_first = build_raw_entry(
        300,
        FieldType::Long,
        1,
        FileMode::Classic,
        Endian::Little,
        InlineOrOffset::Inline(1u32.to_le_bytes().to_vec()),
    );
    let descending_second = build_raw_entry(
        200,
        FieldType::Long,
        1,
        FileMode::Classic,
        Endian::Little,
        InlineOrOffset::Inline(2u32.to_le_bytes().to_vec()),
    );
    let base = cursor.position();
    encode_raw_entry(cursor.backend(), Endian::Little, FileMode::Classic, base, &descending_first).unwrap();
    encode_raw_entry(cursor.backend(), Endian::Little, FileMode::Classic, base + 12, &descending_second).unwrap();
    cursor.seek(base + 24).unwrap();
    cursor.write_bytes(&0u32.to_le_bytes()).unwrap();

    let lenient = IfdReaderOptions {
        max_entries: crate::tiff::ifd_reader::DEFAULT_MAX_ENTRIES,
        order_policy: OrderPolicy::Lenient,
    };
    let directory =
        read_directory(cursor.backend(), Endian::Little, FileMode::Classic, offset, &lenient).unwrap();
    assert_eq!(directory.entries[0].tag, 200);
    assert_eq!(directory.entries[1].tag, 300);

    let strict = IfdReaderOptions {
        max_entries: crate::tiff::ifd_reader::DEFAULT_MAX_ENTRIES,
        order_policy: OrderPolicy::Strict,
    };
    let err = read_directory(cursor.backend(), Endian::Little, FileMode::Classic, offset, &strict).unwrap_err();
    assert!(matches!(err, TiffError::Malformed(_)));
}

/// Invariant 8: a middleware that never calls `next` leaves the pixel
/// buffer untouched.
#[tokio::test]
async fn invariant_pipeline_short_circuit_leaves_buffer_untouched() {
    struct Blocker;
    #[async_trait::async_trait]
    impl Middleware for Blocker {
        async fn invoke(&self, _context: &mut DecodeContext, _next: &PipelineNode) -> crate::tiff::errors::TiffResult<()> {
            Ok(())
        }
    }

    let buffer = Arc::new(PixelBuffer::new(1, 1, 1));
    let mut context = DecodeContext::new(buffer, CancellationToken::new());
    let before = context.pixel_buffer.snapshot();

    Blocker.invoke(&mut context, &PipelineNode::Terminal).await.unwrap();
    assert_eq!(context.pixel_buffer.snapshot(), before);
}

/// Invariant 9: a cancellation signalled before dispatch raises `Cancelled`
/// before any node runs.
#[tokio::test]
async fn invariant_cancellation_before_dispatch_is_observed() {
    let token = CancellationToken::new();
    token.cancel();
    let buffer = Arc::new(PixelBuffer::new(1, 1, 1));
    let mut context = DecodeContext::new(buffer, token);

    let node = PipelineNode::Link {
        middleware: Arc::new(BlackIsZero::new(8)),
        next: Box::new(PipelineNode::Terminal),
    };
    let err = node.run(&mut context).await.unwrap_err();
    assert!(matches!(err, TiffError::Cancelled));
}
