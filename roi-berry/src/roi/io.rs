//! 持久化.
//!
//! 文本格式 (空白分隔, 由计数驱动, 无终止符):
//!
//! ```text
//! <平面数>
//! <z> <行数>
//! <y> <区间数>
//! <x1> <x2>
//! ...
//! ```
//!
//! 对于满足不变量的 ROI, 写出后再读入可以得到结构完全一致的 ROI.

use super::Roi;
use crate::{RoiError, RoiResult};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::{FromStr, SplitAsciiWhitespace};

impl Display for Roi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.planes.len())?;
        for plane in self.planes.iter() {
            writeln!(f, "{} {}", plane.z(), plane.len())?;
            for line in plane.lines() {
                writeln!(f, "{} {}", line.y(), line.len())?;
                for iv in line.intervals() {
                    writeln!(f, "{} {}", iv.x1(), iv.x2())?;
                }
            }
        }
        Ok(())
    }
}

/// 带序号的 token 流.
struct Tokens<'a> {
    it: SplitAsciiWhitespace<'a>,
    idx: usize,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            it: s.split_ascii_whitespace(),
            idx: 0,
        }
    }

    fn next_i32(&mut self, what: &str) -> RoiResult<i32> {
        let idx = self.idx;
        let tok = self
            .it
            .next()
            .ok_or_else(|| RoiError::Parse(idx, format!("缺少{what}")))?;
        self.idx += 1;
        tok.parse()
            .map_err(|_| RoiError::Parse(idx, format!("{what} `{tok}` 不是整数")))
    }

    fn next_count(&mut self, what: &str) -> RoiResult<usize> {
        let idx = self.idx;
        let n = self.next_i32(what)?;
        usize::try_from(n).map_err(|_| RoiError::Parse(idx, format!("{what} `{n}` 为负数")))
    }
}

impl FromStr for Roi {
    type Err = RoiError;

    /// 解析文本格式. 顺序不规范的输入会被规范化 (排序并合并), 结尾多余的 token 视为错误.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens::new(s);
        let mut ans = Roi::new();
        for _ in 0..tokens.next_count("平面数")? {
            let z = tokens.next_i32("平面坐标")?;
            for _ in 0..tokens.next_count("行数")? {
                let y = tokens.next_i32("行坐标")?;
                for _ in 0..tokens.next_count("区间数")? {
                    let idx = tokens.idx;
                    let x1 = tokens.next_i32("区间左端点")?;
                    let x2 = tokens.next_i32("区间右端点")?;
                    if x1 > x2 {
                        return Err(RoiError::Parse(idx, format!("区间 [{x1}, {x2}] 端点顺序错误")));
                    }
                    ans.append_interval(x1, x2, y, z);
                }
            }
        }
        if tokens.it.next().is_some() {
            return Err(RoiError::Parse(tokens.idx, "多余的内容".to_string()));
        }
        Ok(ans)
    }
}

/// 文本读写.
impl Roi {
    /// 以文本格式写出.
    pub fn write_to<W: Write>(&self, mut w: W) -> RoiResult<()> {
        write!(w, "{self}")?;
        w.flush()?;
        Ok(())
    }

    /// 读入文本格式.
    pub fn read_from<R: Read>(mut r: R) -> RoiResult<Roi> {
        let mut s = String::new();
        r.read_to_string(&mut s)?;
        s.parse()
    }

    /// 以文本格式保存到 `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RoiResult<()> {
        self.write_to(BufWriter::new(File::create(path)?))
    }

    /// 从 `path` 读入文本格式.
    pub fn load<P: AsRef<Path>>(path: P) -> RoiResult<Roi> {
        Self::read_from(BufReader::new(File::open(path)?))
    }

    /// 压缩存储.
    pub fn compress(&self) -> RoiResult<CompactRoi> {
        let mut e = ZlibEncoder::new(Vec::with_capacity(64), Compression::best());
        self.write_to(&mut e)?;
        Ok(CompactRoi {
            buf: e.finish()?,
            num_pix: self.num_pix(),
        })
    }
}

/// 压缩存储的 [`Roi`]; 不透明类型.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompactRoi {
    /// zlib 压缩的文本格式.
    buf: Vec<u8>,

    /// 点数.
    num_pix: u64,
}

impl CompactRoi {
    /// 压缩前的点数.
    #[inline]
    pub fn num_pix(&self) -> u64 {
        self.num_pix
    }

    /// 压缩后的字节数.
    #[inline]
    pub fn compressed_len(&self) -> usize {
        self.buf.len()
    }

    /// 解压缩数据.
    pub fn decompress(&self) -> RoiResult<Roi> {
        let ans = Roi::read_from(ZlibDecoder::new(self.buf.as_slice()))?;
        if ans.num_pix() != self.num_pix {
            return Err(RoiError::Corrupted(format!(
                "点数不一致: {} != {}",
                ans.num_pix(),
                self.num_pix
            )));
        }
        Ok(ans)
    }
}

/// 二进制读写.
#[cfg(feature = "serde")]
impl Roi {
    /// 编码为 bincode 字节流.
    pub fn to_bytes(&self) -> RoiResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// 从 bincode 字节流解码. 解码结果不满足不变量时返回错误.
    pub fn from_bytes(buf: &[u8]) -> RoiResult<Roi> {
        let ans: Roi = bincode::deserialize(buf)?;
        if !ans.is_well_formed() {
            return Err(RoiError::Corrupted("ROI 不变量被破坏".to_string()));
        }
        Ok(ans)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::arb_roi;
    use crate::{Point, Roi, RoiError};
    use proptest::prelude::*;

    fn sample() -> Roi {
        let mut r = Roi::new();
        r.add_interval(0, 4, 0, 0);
        r.add_interval(7, 7, 0, 0);
        r.add_interval(-3, -1, 2, 0);
        r.add_point(Point::new(5, -6, -2));
        r
    }

    const SAMPLE_TEXT: &str = "2\n-2 1\n-6 1\n5 5\n0 2\n0 2\n0 4\n7 7\n2 1\n-3 -1\n";

    #[test]
    fn test_exact_text() {
        assert_eq!(sample().to_string(), SAMPLE_TEXT);
        assert_eq!(Roi::new().to_string(), "0\n");
        assert_eq!(SAMPLE_TEXT.parse::<Roi>().unwrap(), sample());
    }

    #[test]
    fn test_whitespace_and_normalisation() {
        let r: Roi = "1 3 2  5 1 1 1   0 1 0 0".parse().unwrap();
        assert_eq!(r.num_planes(), 1);
        assert_eq!(r.plane(3).unwrap().lines()[0].y(), 0);
        assert!(r.is_well_formed());
        // 相邻区间合并
        let r: Roi = "1 0 1 0 2 0 1 2 3".parse().unwrap();
        assert_eq!(r.plane(0).unwrap().lines()[0].len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<Roi>(), Err(RoiError::Parse(0, _))));
        assert!(matches!("1 0 1 0 1 4".parse::<Roi>(), Err(RoiError::Parse(6, _))));
        assert!(matches!("1 0 x".parse::<Roi>(), Err(RoiError::Parse(2, _))));
        assert!(matches!("-1".parse::<Roi>(), Err(RoiError::Parse(0, _))));
        assert!(matches!("1 0 1 0 1 4 3".parse::<Roi>(), Err(RoiError::Parse(5, _))));
        assert!(matches!("0 9".parse::<Roi>(), Err(RoiError::Parse(1, _))));
    }

    #[test]
    fn test_file_and_compact() {
        let r = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.roi");
        r.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE_TEXT);
        assert_eq!(Roi::load(&path).unwrap(), r);
        assert!(matches!(
            Roi::load(dir.path().join("missing.roi")),
            Err(RoiError::Io(_))
        ));

        let c = r.compress().unwrap();
        assert_eq!(c.num_pix(), r.num_pix());
        assert_eq!(c.decompress().unwrap(), r);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode() {
        let r = sample();
        let buf = r.to_bytes().unwrap();
        assert_eq!(Roi::from_bytes(&buf).unwrap(), r);
        assert!(Roi::from_bytes(&buf[..buf.len() / 2]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode_rejects_reversed_interval() {
        // 与 `Roi` 的字段布局一致: planes -> (z, lines) -> (y, intervals) -> (x1, x2)
        let raw: Vec<(i32, Vec<(i32, Vec<(i32, i32)>)>)> = vec![(0, vec![(0, vec![(5, 2)])])];
        let buf = bincode::serialize(&raw).unwrap();
        assert!(matches!(Roi::from_bytes(&buf), Err(RoiError::Corrupted(_))));

        let raw: Vec<(i32, Vec<(i32, Vec<(i32, i32)>)>)> = vec![(0, vec![(0, vec![(2, 5)])])];
        let buf = bincode::serialize(&raw).unwrap();
        assert_eq!(Roi::from_bytes(&buf).unwrap().num_pix(), 4);
    }

    proptest! {
        #[test]
        fn prop_text_round_trip_is_structural(a in arb_roi(20, 30)) {
            let back: Roi = a.to_string().parse().unwrap();
            prop_assert_eq!(&back, &a);
            prop_assert_eq!(back.to_string(), a.to_string());
        }
    }
}
