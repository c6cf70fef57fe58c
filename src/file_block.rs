/// Partitioning of large input files into contiguous, line-aligned byte
/// ranges so independent workers can scan one block each, covering the file
/// exactly once.
///
///
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// ### Summary
/// The raw byte range of one partition, before line alignment. Pure
/// arithmetic over `(file_size, number_of_blocks, block)` so the tiling can
/// be tested without any file: consecutive blocks share boundaries and
/// collectively cover `[0, file_size)` exactly.
/// ### Parameters
/// file_size: total size of the file in bytes
/// number_of_blocks: how many partitions to split into, must be > 0
/// block: the partition index, must be < number_of_blocks
pub fn block_range(file_size: u64, number_of_blocks: u64, block: u64) -> (u64, u64)
{
    assert!(number_of_blocks > 0, "number_of_blocks must be positive");
    assert!(block < number_of_blocks, "block index out of range");
    let start = (file_size as u128 * block as u128 / number_of_blocks as u128) as u64;
    let end = (file_size as u128 * (block as u128 + 1) / number_of_blocks as u128) as u64;
    (start, end)
}

/// ### Summary
/// Advance a seekable reader to the first line boundary at or after `start`.
/// When `start` falls mid-line the partial leading line is discarded (it
/// belongs to the previous block, which reads past its own end to finish it).
/// ### Returns
/// The byte position the reader was left at.
pub fn seek_to_line_start<R>(reader: &mut R, start: u64) -> io::Result<u64>
where
    R: BufRead + Seek,
{
    if start == 0
    {
        reader.seek(SeekFrom::Start(0))?;
        return Ok(0);
    }
    // step back one byte: if the previous byte is a newline the discarded
    // "line" is empty and the block starts exactly at `start`
    reader.seek(SeekFrom::Start(start - 1))?;
    let mut discarded = String::new();
    let consumed = reader.read_line(&mut discarded)?;
    Ok(start - 1 + consumed as u64)
}

/// ### Summary
/// Read the lines of one partition of a file. The partition starts at the
/// first line boundary at or after its byte range start and keeps reading
/// whole lines while the cursor is before the range end, so blocks are
/// line-disjoint and together yield every line of the file exactly once.
/// Trailing newline characters are stripped from the returned lines.
pub fn read_block(path: &Path, number_of_blocks: u64, block: u64) -> io::Result<Vec<String>>
{
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let (start, end) = block_range(file_size, number_of_blocks, block);
    let mut position = seek_to_line_start(&mut reader, start)?;

    let mut lines = Vec::new();
    while position < end
    {
        let mut line = String::new();
        let consumed = reader.read_line(&mut line)?;
        if consumed == 0
        {
            break;
        }
        position += consumed as u64;
        while line.ends_with('\n') || line.ends_with('\r')
        {
            line.pop();
        }
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod test_file_blocks
{
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn ranges_tile_the_file_exactly()
    {
        for &file_size in &[0u64, 1, 10, 97, 1000]
        {
            for &blocks in &[1u64, 2, 3, 7]
            {
                let mut covered = 0;
                for block in 0..blocks
                {
                    let (start, end) = block_range(file_size, blocks, block);
                    assert_eq!(start, covered, "gap before block {}", block);
                    assert!(end >= start);
                    covered = end;
                }
                assert_eq!(covered, file_size);
            }
        }
    }

    #[test]
    #[should_panic(expected = "block index out of range")]
    fn out_of_range_block_index_panics()
    {
        block_range(100, 4, 4);
    }

    #[test]
    fn snapping_discards_the_partial_leading_line()
    {
        let data = b"first\nsecond\nthird\n".to_vec();
        // byte 8 falls inside "second"; the next boundary is byte 13
        let mut cursor = Cursor::new(data.clone());
        assert_eq!(seek_to_line_start(&mut cursor, 8).unwrap(), 13);
        // byte 6 is exactly the start of "second"; byte 5 is the newline
        let mut cursor = Cursor::new(data);
        assert_eq!(seek_to_line_start(&mut cursor, 6).unwrap(), 6);
    }

    #[test]
    fn blocks_are_disjoint_and_cover_every_line()
    {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("rows.tsv");
        let lines: Vec<String> = (0..57).map(|index| format!("row_{}\tpayload", index)).collect();
        let mut file = File::create(&path).unwrap();
        for line in lines.iter()
        {
            writeln!(file, "{}", line).unwrap();
        }
        drop(file);

        for &blocks in &[1u64, 2, 3, 5, 8]
        {
            let mut collected = Vec::new();
            for block in 0..blocks
            {
                collected.extend(read_block(&path, blocks, block).unwrap());
            }
            assert_eq!(collected, lines, "with {} blocks", blocks);
        }
    }
}
