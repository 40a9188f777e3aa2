use redb::TypeName;
pub use v1 as latest;

pub mod v1;

pub trait RecordVariant {
    const VERSION: u8;
}

#[derive(Debug, Clone)]
pub enum VersionedSearchKey {
    V1(v1::SearchKeyRecord),
}

impl VersionedSearchKey {
    pub fn into_latest(self) -> latest::SearchKeyRecord {
        match self {
            VersionedSearchKey::V1(record) => record,
        }
    }
}

impl redb::Value for VersionedSearchKey {
    type SelfType<'a> = VersionedSearchKey;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        let (version, data) = data.split_first().expect("empty data");
        match *version {
            v1::SearchKeyRecord::VERSION => {
                let v1 = postcard::from_bytes::<v1::SearchKeyRecord>(data)
                    .expect("invalid search key record");
                VersionedSearchKey::V1(v1)
            }
            version => panic!("unsupported version: {}", version),
        }
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        match value {
            VersionedSearchKey::V1(v1) => {
                postcard::to_extend(v1, vec![v1::SearchKeyRecord::VERSION]).unwrap()
            }
        }
    }

    fn type_name() -> TypeName {
        TypeName::new("marquee::SearchKey")
    }
}
